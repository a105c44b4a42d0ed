//! Kind-specific metadata readers and the registry that selects them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::hcl::{self, Block, Item};
use super::info::{ModuleInfo, ModuleKind, OutputInfo, VarInfo};
use super::packer::PackerReader;
use super::terraform::TerraformReader;
use crate::error::MetadataError;

/// Extracts [`ModuleInfo`] from a module directory of one kind.
pub trait ModuleReader: Send + Sync {
    fn get_info(&self, path: &Path) -> Result<ModuleInfo, MetadataError>;
}

/// Lookup table from module kind to reader.
#[derive(Clone)]
pub struct ReaderRegistry {
    readers: HashMap<ModuleKind, Arc<dyn ModuleReader>>,
}

impl std::fmt::Debug for ReaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.readers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ReaderRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }

    /// Registry with the built-in terraform and packer readers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ModuleKind::Terraform, Arc::new(TerraformReader));
        registry.register(ModuleKind::Packer, Arc::new(PackerReader));
        registry
    }

    /// Install or replace the reader for `kind`.
    pub fn register(&mut self, kind: ModuleKind, reader: Arc<dyn ModuleReader>) {
        self.readers.insert(kind, reader);
    }

    pub fn get(&self, kind: ModuleKind) -> Option<&Arc<dyn ModuleReader>> {
        self.readers.get(&kind)
    }
}

/// File selection and block handling for one HCL dialect.
pub(crate) struct HclDialect {
    pub suffix: &'static str,
    pub pattern: &'static str,
    pub outputs: bool,
}

/// Read every matching file in `dir` and collect variables and outputs.
pub(crate) fn read_hcl_dir(dir: &Path, dialect: &HclDialect) -> Result<ModuleInfo, MetadataError> {
    let meta = fs::metadata(dir).map_err(|source| MetadataError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(MetadataError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let files = module_files(dir, dialect.suffix)?;
    if files.is_empty() {
        return Err(MetadataError::NoModuleFiles {
            path: dir.to_path_buf(),
            pattern: dialect.pattern,
        });
    }

    let mut info = ModuleInfo::default();
    for file in &files {
        let content = fs::read_to_string(file).map_err(|source| MetadataError::ReadFile {
            path: file.clone(),
            source,
        })?;
        let items = hcl::parse(&content).map_err(|err| MetadataError::Syntax {
            path: file.clone(),
            message: err.to_string(),
        })?;

        for item in items {
            let Item::Block(block) = item else { continue };
            match (block.kind.as_str(), block.labels.as_slice()) {
                ("variable", [name]) => info.inputs.push(var_info(name, &block)),
                ("output", [name]) if dialect.outputs => {
                    info.outputs.push(output_info(name, &block))
                }
                _ => {}
            }
        }
    }

    debug!(
        path = %dir.display(),
        files = files.len(),
        inputs = info.inputs.len(),
        outputs = info.outputs.len(),
        "read module metadata"
    );
    Ok(info)
}

fn module_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, MetadataError> {
    let read_err = |source| MetadataError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(suffix) {
            continue;
        }
        // Follows symlinks so linked module files are still read
        if entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn var_info(name: &str, block: &Block) -> VarInfo {
    let default = block.attribute("default").map(str::to_string);
    VarInfo {
        name: name.to_string(),
        type_expr: block.attribute("type").map(str::to_string),
        description: block.attribute("description").map(text_value),
        required: default.is_none(),
        default,
    }
}

fn output_info(name: &str, block: &Block) -> OutputInfo {
    OutputInfo {
        name: name.to_string(),
        description: block.attribute("description").map(text_value),
        sensitive: block.attribute("sensitive") == Some("true"),
    }
}

fn text_value(expr: &str) -> String {
    hcl::string_literal(expr).unwrap_or_else(|| expr.to_string())
}
