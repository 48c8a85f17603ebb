//! CLI configuration.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/fillgen/config.toml`
//! - Windows: `%APPDATA%/fillgen/config.toml`
//!
//! A missing file means defaults; nothing is written back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Defaults applied when the command line leaves an option out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory generated files go to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Write chunk size as a size string.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: String,

    /// File type preset used when `--type` is absent.
    #[serde(default = "default_file_type")]
    pub default_type: String,
}

fn default_output_dir() -> String {
    ".".into()
}

fn default_chunk_size() -> String {
    "1MiB".into()
}

fn default_file_type() -> String {
    "bin".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            chunk_size: default_chunk_size(),
            default_type: default_file_type(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the platform path when `None`.
    ///
    /// An explicitly given path must exist; the platform path may not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (config_path(), false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("config file not found: {}", path.display());
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("fillgen").join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home)
                .join(".config")
                .join("fillgen")
                .join("config.toml"),
            Err(_) => PathBuf::from("/tmp/fillgen/config.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, ".");
        assert_eq!(config.chunk_size, "1MiB");
        assert_eq!(config.default_type, "bin");
    }

    #[test]
    fn config_partial_toml() {
        let config: Config = toml::from_str(r#"default_type = "pdf""#).unwrap();
        assert_eq!(config.default_type, "pdf");
        assert_eq!(config.chunk_size, "1MiB");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = Config {
            output_dir: "/data/fixtures".into(),
            chunk_size: "8MiB".into(),
            default_type: "iso".into(),
        };
        let parsed: Config = toml::from_str(&toml::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(parsed.output_dir, "/data/fixtures");
        assert_eq!(parsed.chunk_size, "8MiB");
        assert_eq!(parsed.default_type, "iso");
    }

    #[test]
    fn load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "output_dir = \"/srv/out\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output_dir, "/srv/out");
    }

    #[test]
    fn load_missing_explicit_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn load_invalid_toml_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "chunk_size = [").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn config_path_not_empty() {
        assert!(config_path().to_string_lossy().contains("fillgen"));
    }
}
