mod config;
pub mod snapshot;

pub use config::{Config, GeneratorConfig, LoggingConfig, PlannerConfig};
pub use snapshot::{SnapshotKey, SnapshotStore};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `STUDBUD_HOME` wins when set. Otherwise `~/.config/studbud[-dev]/`,
/// with the `-dev` suffix when `STUDBUD_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("STUDBUD_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDBUD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studbud-dev")
            } else {
                base_dir.join("studbud")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
