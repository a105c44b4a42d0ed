//! Source reader for modules on the local filesystem.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::SourceReader;
use super::apis::{ApiTable, api_lookup_key};
use super::path::is_local_path;
use crate::error::SourceError;
use crate::fs::copy_from_path;
use crate::module::{ModuleInfo, ModuleKind, ReaderRegistry};

/// Reads modules referenced by `./`, `../` or absolute paths.
#[derive(Debug, Clone)]
pub struct LocalSourceReader {
    readers: Arc<ReaderRegistry>,
    apis: Arc<ApiTable>,
}

impl Default for LocalSourceReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSourceReader {
    /// Reader using the built-in metadata readers and API table.
    pub fn new() -> Self {
        Self {
            readers: Arc::new(ReaderRegistry::with_defaults()),
            apis: ApiTable::builtin(),
        }
    }

    pub fn with_readers(mut self, readers: ReaderRegistry) -> Self {
        self.readers = Arc::new(readers);
        self
    }

    pub fn with_api_table(mut self, apis: Arc<ApiTable>) -> Self {
        self.apis = apis;
        self
    }

    pub fn api_table(&self) -> &ApiTable {
        &self.apis
    }
}

impl SourceReader for LocalSourceReader {
    fn get_module_info(&self, mod_path: &str, kind: ModuleKind) -> Result<ModuleInfo, SourceError> {
        if !is_local_path(mod_path) {
            return Err(SourceError::InvalidSource {
                path: mod_path.to_string(),
            });
        }

        let reader = self
            .readers
            .get(kind)
            .ok_or(SourceError::NoReader { kind })?;
        let mut info = reader.get_info(Path::new(mod_path))?;

        if let Some(key) = api_lookup_key(mod_path) {
            info.required_apis = self.apis.lookup(key);
            debug!(path = mod_path, key, apis = ?info.required_apis, "inferred required APIs");
        }

        Ok(info)
    }

    fn get_module(&self, mod_path: &str, dest: &Path) -> Result<(), SourceError> {
        if !is_local_path(mod_path) {
            return Err(SourceError::InvalidSource {
                path: mod_path.to_string(),
            });
        }

        if let Err(err) = fs::metadata(mod_path)
            && err.kind() == io::ErrorKind::NotFound
        {
            return Err(SourceError::SourceNotFound {
                path: mod_path.to_string(),
            });
        }

        debug!(path = mod_path, dest = %dest.display(), "copying local module");
        copy_from_path(Path::new(mod_path), dest)?;
        Ok(())
    }
}
