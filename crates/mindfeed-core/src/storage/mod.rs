mod config;
mod likes;

pub use config::{Config, FeedConfig, PolicyConfig};
pub use likes::LikeStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `MINDFEED_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/mindfeed[-dev]/`, with `MINDFEED_ENV=dev` selecting
/// the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MINDFEED_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MINDFEED_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("mindfeed-dev")
            } else {
                base_dir.join("mindfeed")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
