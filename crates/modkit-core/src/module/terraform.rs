//! Metadata reader for Terraform modules.

use std::path::Path;

use super::info::ModuleInfo;
use super::reader::{HclDialect, ModuleReader, read_hcl_dir};
use crate::error::MetadataError;

const TERRAFORM: HclDialect = HclDialect {
    suffix: ".tf",
    pattern: "*.tf",
    outputs: true,
};

/// Reads `variable` and `output` blocks from the `*.tf` files of a module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformReader;

impl ModuleReader for TerraformReader {
    fn get_info(&self, path: &Path) -> Result<ModuleInfo, MetadataError> {
        read_hcl_dir(path, &TERRAFORM)
    }
}
