//! Configuration schema for modkit.toml

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::source::ApiTable;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModkitConfig {
    /// Extra or replacement entries for the default-API table, keyed by
    /// `/modules/...` lookup key
    #[serde(default)]
    pub required_apis: BTreeMap<String, Vec<String>>,
}

impl ModkitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in API table with this config's entries layered on top.
    pub fn api_table(&self) -> Arc<ApiTable> {
        let builtin = ApiTable::builtin();
        if self.required_apis.is_empty() {
            return builtin;
        }
        Arc::new(builtin.with_overrides(self.required_apis.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_shares_builtin_table() {
        let config = ModkitConfig::new();
        assert!(Arc::ptr_eq(&config.api_table(), &ApiTable::builtin()));
    }

    #[test]
    fn overrides_apply_on_top_of_builtin() {
        let config: ModkitConfig = toml::from_str(
            r#"
[required_apis]
"/modules/compute/my-vm" = ["compute.googleapis.com", "iap.googleapis.com"]
"/modules/network/vpc" = []
"#,
        )
        .expect("config should parse");

        let table = config.api_table();
        assert_eq!(
            table.lookup("/modules/compute/my-vm"),
            vec![
                "compute.googleapis.com".to_string(),
                "iap.googleapis.com".to_string()
            ]
        );
        assert!(table.lookup("/modules/network/vpc").is_empty());
        assert_eq!(
            table.lookup("/modules/file-system/filestore"),
            vec!["file.googleapis.com".to_string()]
        );
    }
}
