//! Module metadata types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownKind;

/// Which metadata dialect a module is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Terraform,
    Packer,
}

impl ModuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Terraform => "terraform",
            ModuleKind::Packer => "packer",
        }
    }
}

impl Default for ModuleKind {
    fn default() -> Self {
        Self::Terraform
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terraform" => Ok(Self::Terraform),
            "packer" => Ok(Self::Packer),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// An input variable declared by a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarInfo {
    pub name: String,
    /// Type constraint as written, e.g. `list(string)`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value expression as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// True when the variable has no default
    pub required: bool,
}

/// An output value exported by a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sensitive: bool,
}

/// Structured metadata about a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    #[serde(default)]
    pub inputs: Vec<VarInfo>,
    #[serde(default)]
    pub outputs: Vec<OutputInfo>,
    /// Cloud service APIs that must be enabled to deploy the module
    #[serde(default)]
    pub required_apis: Vec<String>,
}

impl ModuleInfo {
    pub fn input(&self, name: &str) -> Option<&VarInfo> {
        self.inputs.iter().find(|v| v.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputInfo> {
        self.outputs.iter().find(|o| o.name == name)
    }
}
