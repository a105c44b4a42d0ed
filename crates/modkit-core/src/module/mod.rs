//! Module metadata: kinds, records and the readers that produce them.

mod hcl;
pub mod info;
pub mod packer;
pub mod reader;
pub mod terraform;

pub use info::{ModuleInfo, ModuleKind, OutputInfo, VarInfo};
pub use packer::PackerReader;
pub use reader::{ModuleReader, ReaderRegistry};
pub use terraform::TerraformReader;
