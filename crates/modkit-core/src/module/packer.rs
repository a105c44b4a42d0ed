//! Metadata reader for Packer templates.

use std::path::Path;

use super::info::ModuleInfo;
use super::reader::{HclDialect, ModuleReader, read_hcl_dir};
use crate::error::MetadataError;

const PACKER: HclDialect = HclDialect {
    suffix: ".pkr.hcl",
    pattern: "*.pkr.hcl",
    outputs: false,
};

/// Reads `variable` blocks from the `*.pkr.hcl` files of a template.
///
/// Packer templates export nothing, so `outputs` is always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackerReader;

impl ModuleReader for PackerReader {
    fn get_info(&self, path: &Path) -> Result<ModuleInfo, MetadataError> {
        read_hcl_dir(path, &PACKER)
    }
}
