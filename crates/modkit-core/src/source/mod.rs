//! Source readers for module references.
//!
//! A source string is classified lexically (see [`classify_source`]) and
//! handed to the reader for its kind. Two operations make up a reader:
//! - [`SourceReader::get_module_info`]: metadata for a module of a given kind
//! - [`SourceReader::get_module`]: copy the module into a deployment directory
//!
//! Only local filesystem sources have a reader; everything else is
//! reported as unsupported.

mod apis;
mod local;
mod path;

use std::path::Path;

pub use apis::{ApiTable, api_lookup_key};
pub use local::LocalSourceReader;
pub use path::{SourceKind, classify_source, is_embedded_path, is_git_path, is_local_path};

use crate::error::SourceError;
use crate::module::{ModuleInfo, ModuleKind};

/// Capability shared by every module source strategy.
pub trait SourceReader: Send + Sync {
    /// Metadata for the module at `mod_path`, parsed as `kind`.
    fn get_module_info(&self, mod_path: &str, kind: ModuleKind) -> Result<ModuleInfo, SourceError>;

    /// Copy the module at `mod_path` into `dest`.
    fn get_module(&self, mod_path: &str, dest: &Path) -> Result<(), SourceError>;
}

/// Picks the reader for a source string.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    local: LocalSourceReader,
}

impl SourceResolver {
    pub fn new(local: LocalSourceReader) -> Self {
        Self { local }
    }

    /// The reader responsible for `source`.
    pub fn reader_for(&self, source: &str) -> Result<&dyn SourceReader, SourceError> {
        match classify_source(source) {
            SourceKind::Local => Ok(&self.local),
            kind => Err(SourceError::Unsupported {
                path: source.to_string(),
                kind,
            }),
        }
    }

    pub fn get_module_info(&self, source: &str, kind: ModuleKind) -> Result<ModuleInfo, SourceError> {
        self.reader_for(source)?.get_module_info(source, kind)
    }

    pub fn get_module(&self, source: &str, dest: &Path) -> Result<(), SourceError> {
        self.reader_for(source)?.get_module(source, dest)
    }
}
