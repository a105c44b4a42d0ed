//! Default required-API inference for library modules.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

const COMMUNITY_MODULES: &str = "/community/modules/";
const MODULES: &str = "/modules/";

/// Built-in table keyed by the `/modules/...` tail of a module path.
///
/// Community modules share the key space with core modules because the
/// `community` segment is dropped from the key.
const BUILTIN_APIS: &[(&str, &[&str])] = &[
    // core library
    ("/modules/compute/vm-instance", &["compute.googleapis.com"]),
    ("/modules/file-system/filestore", &["file.googleapis.com"]),
    ("/modules/file-system/cloud-storage-bucket", &["storage.googleapis.com"]),
    ("/modules/file-system/pre-existing-network-storage", &[]),
    ("/modules/monitoring/dashboard", &["stackdriver.googleapis.com"]),
    ("/modules/network/pre-existing-vpc", &["compute.googleapis.com"]),
    ("/modules/network/vpc", &["compute.googleapis.com"]),
    (
        "/modules/packer/custom-image",
        &["compute.googleapis.com", "storage.googleapis.com"],
    ),
    (
        "/modules/scheduler/batch-job-template",
        &["batch.googleapis.com", "compute.googleapis.com", "logging.googleapis.com"],
    ),
    (
        "/modules/scheduler/batch-login-node",
        &["batch.googleapis.com", "compute.googleapis.com", "logging.googleapis.com"],
    ),
    ("/modules/scripts/startup-script", &["storage.googleapis.com"]),
    // community library
    ("/modules/compute/SchedMD-slurm-on-gcp-partition", &["compute.googleapis.com"]),
    ("/modules/compute/htcondor-execute-point", &["compute.googleapis.com"]),
    ("/modules/compute/pbspro-execution", &["compute.googleapis.com"]),
    ("/modules/compute/schedmd-slurm-gcp-v5-node-group", &["compute.googleapis.com"]),
    ("/modules/compute/schedmd-slurm-gcp-v5-partition", &["compute.googleapis.com"]),
    (
        "/modules/database/slurm-cloudsql-federation",
        &["bigqueryconnection.googleapis.com", "sqladmin.googleapis.com"],
    ),
    (
        "/modules/file-system/DDN-EXAScaler",
        &[
            "compute.googleapis.com",
            "deploymentmanager.googleapis.com",
            "iam.googleapis.com",
            "runtimeconfig.googleapis.com",
        ],
    ),
    (
        "/modules/file-system/Intel-DAOS",
        &["compute.googleapis.com", "iam.googleapis.com", "secretmanager.googleapis.com"],
    ),
    ("/modules/file-system/nfs-server", &["compute.googleapis.com"]),
    (
        "/modules/project/new-project",
        &[
            "admin.googleapis.com",
            "cloudresourcemanager.googleapis.com",
            "cloudbilling.googleapis.com",
            "iam.googleapis.com",
        ],
    ),
    ("/modules/project/service-account", &["iam.googleapis.com"]),
    ("/modules/project/service-enablement", &["serviceusage.googleapis.com"]),
    ("/modules/remote-desktop/chrome-remote-desktop", &["compute.googleapis.com"]),
    ("/modules/scheduler/SchedMD-slurm-on-gcp-controller", &["compute.googleapis.com"]),
    ("/modules/scheduler/SchedMD-slurm-on-gcp-login-node", &["compute.googleapis.com"]),
    (
        "/modules/scheduler/cloud-batch-job",
        &["batch.googleapis.com", "compute.googleapis.com", "logging.googleapis.com"],
    ),
    (
        "/modules/scheduler/cloud-batch-login-node",
        &["batch.googleapis.com", "compute.googleapis.com", "logging.googleapis.com"],
    ),
    (
        "/modules/scheduler/htcondor-configure",
        &["iam.googleapis.com", "secretmanager.googleapis.com"],
    ),
    (
        "/modules/scheduler/schedmd-slurm-gcp-v5-controller",
        &[
            "compute.googleapis.com",
            "iam.googleapis.com",
            "pubsub.googleapis.com",
            "secretmanager.googleapis.com",
        ],
    ),
    ("/modules/scheduler/schedmd-slurm-gcp-v5-login", &["compute.googleapis.com"]),
    ("/modules/scripts/htcondor-install", &[]),
    ("/modules/scripts/omnia-install", &[]),
    ("/modules/scripts/spack-install", &["storage.googleapis.com"]),
    ("/modules/scripts/wait-for-startup", &["compute.googleapis.com"]),
];

static BUILTIN: LazyLock<Arc<ApiTable>> = LazyLock::new(|| {
    Arc::new(ApiTable::from_entries(BUILTIN_APIS.iter().map(|(key, apis)| {
        (
            key.to_string(),
            apis.iter().map(|api| api.to_string()).collect(),
        )
    })))
});

/// Derive the API lookup key from a module path.
///
/// The first `/community/modules/` occurrence wins; otherwise the first
/// `/modules/` occurrence. The key runs from the `/modules/` that starts
/// the match to the end of the path. Matching is plain substring search,
/// so any directory literally named `modules` qualifies.
pub fn api_lookup_key(mod_path: &str) -> Option<&str> {
    if let Some(idx) = mod_path.find(COMMUNITY_MODULES) {
        let start = idx + COMMUNITY_MODULES.len() - MODULES.len();
        return Some(&mod_path[start..]);
    }
    mod_path.find(MODULES).map(|idx| &mod_path[idx..])
}

/// Read-only map from lookup key to the ordered list of required APIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiTable {
    entries: HashMap<String, Vec<String>>,
}

impl ApiTable {
    /// The process-wide built-in table.
    pub fn builtin() -> Arc<ApiTable> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// A copy of this table with `overrides` layered on top.
    pub fn with_overrides(&self, overrides: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(overrides);
        Self { entries }
    }

    /// APIs for `key`; an unknown key yields an empty list.
    pub fn lookup(&self, key: &str) -> Vec<String> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
