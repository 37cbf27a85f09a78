use std::path::PathBuf;
use anyhow::{anyhow, Result};
use directories::ProjectDirs;

/// Environment variable overriding the location of the global config file.
pub const CONFIG_ENV: &str = "LIBSWITCH_CONFIG";

pub fn get_global_config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "libswitch", "libswitch")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Returns the path of the global `config.toml`.
///
/// `LIBSWITCH_CONFIG` wins over the platform config directory.
pub fn get_global_config_file() -> Result<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(get_global_config_dir()?.join("config.toml")),
    }
}
