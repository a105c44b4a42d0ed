//! modkit Core Library
//!
//! Resolves deployment modules referenced by local filesystem paths:
//! reads their input/output metadata, infers the cloud APIs library modules
//! need, and copies module trees into a deployment directory.

pub mod config;
pub mod error;
pub mod fs;
pub mod module;
pub mod source;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, ModkitConfig};

    // Errors
    pub use crate::error::{ConfigError, CopyError, MetadataError, SourceError};

    // Modules
    pub use crate::module::{
        ModuleInfo, ModuleKind, ModuleReader, OutputInfo, ReaderRegistry, VarInfo,
    };

    // Sources
    pub use crate::source::{
        ApiTable, LocalSourceReader, SourceKind, SourceReader, SourceResolver, classify_source,
        is_local_path,
    };

    // Filesystem
    pub use crate::fs::{copy_from_path, hash_tree};
}
