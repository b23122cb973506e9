//! TOML configuration for the reconciliation commands.
//!
//! Looked up at ~/.config/lenslink/config.toml unless --config overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::exit_codes::{EXIT_ERROR, EXIT_USAGE};
use crate::CliError;

fn default_api_base() -> String {
    "https://api.photos.example.com".into()
}

fn default_quarantine_album() -> String {
    "To Be Deleted".into()
}

fn default_duplicates_album() -> String {
    "Potential Duplicates".into()
}

fn default_throttle_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Photo host API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Path to the desktop catalog's SQLite file.
    pub catalog: PathBuf,

    /// Id of the album the catalog publishes into.
    pub album_id: String,

    /// Album photos are parked in instead of being deleted.
    #[serde(default = "default_quarantine_album")]
    pub quarantine_album: String,

    /// Album flagged duplicates are gathered into for manual review.
    #[serde(default = "default_duplicates_album")]
    pub duplicates_album: String,

    /// Pause between remote writes, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Inventory cache file. Defaults next to the config file.
    #[serde(default)]
    pub cache: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml(s: &str) -> Result<Self, String> {
        let config: AppConfig = toml::from_str(s).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.album_id.trim().is_empty() {
            return Err("album_id must not be empty".into());
        }
        if self.catalog.as_os_str().is_empty() {
            return Err("catalog must not be empty".into());
        }
        if self.quarantine_album.trim().is_empty() {
            return Err("quarantine_album must not be empty".into());
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!("api_base is not a URL: {}", self.api_base));
        }
        Ok(())
    }

    /// Resolved inventory cache path.
    pub fn cache_path(&self) -> PathBuf {
        self.cache.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lenslink/inventory.jsonl")
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("lenslink/config.toml"))
}

/// Load the config, from --config when given, otherwise the default path.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path().ok_or_else(|| CliError {
            code: EXIT_ERROR,
            message: "Could not determine config directory".into(),
            hint: Some("pass --config explicitly".into()),
        })?,
    };
    let contents = std::fs::read_to_string(&path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: Some("create it or pass --config".into()),
    })?;
    AppConfig::from_toml(&contents).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("invalid config {}: {e}", path.display()),
        hint: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = AppConfig::from_toml(
            r#"
            catalog = "/photos/catalog.db"
            album_id = "777"
            "#,
        )
        .unwrap();
        assert_eq!(config.quarantine_album, "To Be Deleted");
        assert_eq!(config.duplicates_album, "Potential Duplicates");
        assert_eq!(config.throttle_ms, 250);
        assert!(config.api_base.starts_with("https://"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            api_base = "https://host.test"
            catalog = "/photos/catalog.db"
            album_id = "777"
            quarantine_album = "Trash Bin"
            throttle_ms = 0
            cache = "/tmp/inv.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(config.quarantine_album, "Trash Bin");
        assert_eq!(config.throttle_ms, 0);
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/inv.jsonl"));
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        assert!(AppConfig::from_toml(r#"album_id = "777""#).is_err());
        assert!(AppConfig::from_toml(r#"catalog = "/db""#).is_err());
    }

    #[test]
    fn validation_rejects_empty_and_malformed_values() {
        let empty_album = r#"
            catalog = "/db"
            album_id = " "
        "#;
        assert!(AppConfig::from_toml(empty_album).is_err());

        let bad_base = r#"
            api_base = "ftp://nope"
            catalog = "/db"
            album_id = "777"
        "#;
        assert!(AppConfig::from_toml(bad_base)
            .unwrap_err()
            .contains("api_base"));
    }

    #[test]
    fn load_config_reads_an_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "catalog = \"/db\"\nalbum_id = \"777\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.album_id, "777");

        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let config = r#"
            catalog = "/db"
            album_id = "777"
            albumid = "typo"
        "#;
        assert!(AppConfig::from_toml(config).is_err());
    }
}
