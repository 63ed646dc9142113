//! Observable single-value stores.
//!
//! A [`StoreRegistry`] owns every store of a session. Each store holds one
//! whole value addressed by a typed [`StoreKey`]; writes replace the value and
//! notify subscribers synchronously. Persistence goes through a
//! [`StoreBackend`] and is best-effort.

mod backend;
mod registry;

pub use backend::{MemoryBackend, SqliteBackend, StoreBackend};
pub use registry::{StoreChange, StoreKey, StoreRegistry, StoreValue, SubscriptionHandle};

use std::path::PathBuf;

/// Returns `~/.config/homeboard[-dev]/`, creating it if needed.
///
/// `HOMEBOARD_DATA_DIR` overrides the location entirely. Otherwise
/// `HOMEBOARD_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    if let Ok(dir) = std::env::var("HOMEBOARD_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HOMEBOARD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("homeboard-dev")
    } else {
        base_dir.join("homeboard")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
