use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};
use crate::alias::DEFAULT_ALIAS_FILE;
use crate::global::utils::get_global_config_file;

#[cfg(windows)]
pub const DEFAULT_INSTALLER: &str = "npm.cmd";
#[cfg(not(windows))]
pub const DEFAULT_INSTALLER: &str = "npm";

/// Overrides the installer program.
pub const INSTALLER_ENV: &str = "LIBSWITCH_INSTALLER";
/// Overrides the alias file path.
pub const ALIAS_FILE_ENV: &str = "LIBSWITCH_ALIAS_FILE";

/// Tunables for how libraries get installed and where aliases are written.
///
/// Loaded from the global `config.toml`, e.g.
///
/// ```toml
/// installer = "pnpm"
/// install-args = ["add"]
/// alias-file = "tsconfig.base.json"
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Package-manager program.
    pub installer: String,
    /// Arguments placed before the target specifier.
    pub install_args: Vec<String>,
    /// Alias configuration file, relative to the project root.
    pub alias_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            installer: DEFAULT_INSTALLER.to_string(),
            install_args: vec!["install".to_string()],
            alias_file: DEFAULT_ALIAS_FILE.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or deserialized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Loads the global config file, or defaults if there is none.
    pub fn load_global() -> Result<Settings> {
        let path = get_global_config_file()?;
        if path.exists() {
            Settings::load(path)
        } else {
            Ok(Settings::default())
        }
    }

    /// Applies environment overrides, looked up through `var`.
    pub fn with_env<F>(mut self, var: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(installer) = var(INSTALLER_ENV).filter(|v| !v.is_empty()) {
            self.installer = installer;
        }
        if let Some(alias_file) = var(ALIAS_FILE_ENV).filter(|v| !v.is_empty()) {
            self.alias_file = alias_file;
        }
        self
    }

    /// Global file, then the process environment.
    pub fn resolve() -> Result<Settings> {
        Ok(Settings::load_global()?.with_env(|key| std::env::var(key).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.installer, DEFAULT_INSTALLER);
        assert_eq!(settings.install_args, vec!["install"]);
        assert_eq!(settings.alias_file, "tsconfig.json");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "installer = \"pnpm\"\ninstall-args = [\"add\"]\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.installer, "pnpm");
        assert_eq!(settings.install_args, vec!["add"]);
        assert_eq!(settings.alias_file, "tsconfig.json");
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "instaler = \"pnpm\"\n").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "installer = \"yarn\"\ninstall-args = [\"add\"]\nalias-file = \"tsconfig.base.json\"\n",
        )
        .unwrap();
        let expected = Settings {
            installer: "yarn".to_string(),
            install_args: vec!["add".to_string()],
            alias_file: "tsconfig.base.json".to_string(),
        };
        assert_eq!(Settings::load(&path).unwrap(), expected);
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::default().with_env(|key| match key {
            INSTALLER_ENV => Some("bun".to_string()),
            ALIAS_FILE_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(settings.installer, "bun");
        assert_eq!(settings.alias_file, "tsconfig.json");
    }
}
