//! Saved credentials for the photo host.
//!
//! `lenslink login` verifies a token and writes it here; every other
//! command picks it up through [`RemoteClient::from_saved_auth`]. One JSON
//! file under the user config dir, mode 0600 on Unix.
//!
//! [`RemoteClient::from_saved_auth`]: crate::RemoteClient::from_saved_auth

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// Bearer token for the photo host API.
    pub token: String,
    /// API base URL, e.g. "https://api.photos.example.com".
    pub api_base: String,
    /// Account the token resolved to at login time. Display only; absent
    /// in files written before login started recording it.
    #[serde(default)]
    pub account: Option<String>,
}

impl AuthCredentials {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: api_base.into(),
            account: None,
        }
    }
}

/// Where the credentials file lives. `None` when the platform reports no
/// user config directory.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lenslink").join("auth.json"))
}

/// Read the saved credentials. A missing or garbled file reads as "not
/// logged in" rather than an error; login rewrites it either way.
pub fn load_auth() -> Option<AuthCredentials> {
    load_auth_from(&auth_file_path()?)
}

pub fn load_auth_from(path: &Path) -> Option<AuthCredentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn save_auth(creds: &AuthCredentials) -> Result<(), String> {
    let path = auth_file_path().ok_or("no user config directory")?;
    save_auth_to(&path, creds)
}

/// Write the credentials file, creating parent directories as needed.
/// The token grants full account access, so the file is locked down to
/// the owner on Unix.
pub fn save_auth_to(path: &Path, creds: &AuthCredentials) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(creds).map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| format!("cannot restrict {}: {e}", path.display()))?;
    }

    Ok(())
}

/// Remove the credentials file. Already-absent counts as logged out.
pub fn delete_auth() -> Result<(), String> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("cannot delete {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("auth.json");

        let mut creds = AuthCredentials::new("tok123", "https://api.test");
        creds.account = Some("alice".into());
        save_auth_to(&path, &creds).unwrap();

        let loaded = load_auth_from(&path).unwrap();
        assert_eq!(loaded.token, "tok123");
        assert_eq!(loaded.api_base, "https://api.test");
        assert_eq!(loaded.account.as_deref(), Some("alice"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        save_auth_to(&path, &AuthCredentials::new("tok", "https://api.test")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn files_without_an_account_field_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, r#"{"token":"tok","api_base":"https://api.test"}"#).unwrap();

        let loaded = load_auth_from(&path).unwrap();
        assert_eq!(loaded.token, "tok");
        assert!(loaded.account.is_none());
    }

    #[test]
    fn missing_or_garbled_files_read_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_auth_from(&dir.path().join("absent.json")).is_none());

        let garbled = dir.path().join("auth.json");
        std::fs::write(&garbled, "{\"token\":").unwrap();
        assert!(load_auth_from(&garbled).is_none());
    }
}
