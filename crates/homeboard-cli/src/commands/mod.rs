pub mod config;
pub mod insights;
pub mod reminder;
pub mod store;
pub mod timer;

use homeboard_core::{Config, SqliteBackend, StoreRegistry};

pub type CmdResult = homeboard_core::Result<()>;

/// Open the on-disk registry under the configured namespace.
pub fn open_session(config: &Config) -> homeboard_core::Result<StoreRegistry> {
    let backend = SqliteBackend::open()?;
    Ok(StoreRegistry::new(backend, config.storage.namespace.clone()))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
