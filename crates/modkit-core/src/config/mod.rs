//! Configuration loaded from `modkit.toml`
//!
//! Lookup order for the file:
//! - An explicit path (`--config`)
//! - `$MODKIT_CONFIG`
//! - `<config dir>/modkit/modkit.toml`

pub mod paths;
pub mod schema;
pub mod store;

pub use paths::{CONFIG_ENV, default_config_path};
pub use schema::ModkitConfig;
pub use store::ConfigStore;
