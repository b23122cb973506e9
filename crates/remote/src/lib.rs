//! Photo host API client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the full
//! reconciliation surface: account-wide inventory listing, live engagement
//! lookups, album membership edits, and photo deletion.

pub mod auth;
pub mod client;
pub mod inventory;

pub use client::RemoteClient;

use lenslink_recon::RemoteRecord;

/// Error type for remote operations.
#[derive(Debug)]
pub enum RemoteError {
    /// No auth credentials configured
    NotAuthenticated,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// File I/O error
    Io(String),
    /// Server returned a validation error (4xx with message)
    Validation(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::NotAuthenticated => {
                write!(f, "Not authenticated — run `lenslink login` first")
            }
            RemoteError::Network(msg) => write!(f, "Network error: {}", msg),
            RemoteError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            RemoteError::Parse(msg) => write!(f, "Parse error: {}", msg),
            RemoteError::Io(msg) => write!(f, "I/O error: {}", msg),
            RemoteError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Live engagement counters for one photo.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Engagement {
    pub views: u64,
    pub comments: u64,
    pub favorites: u64,
}

/// Album (photoset) info.
#[derive(Debug, Clone)]
pub struct AlbumInfo {
    pub id: String,
    pub title: String,
}

/// Outcome of an album membership edit. The host reports "already there"
/// and "not in album" as errors; both leave the album in the requested
/// state, so they are surfaced as no-ops rather than failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumChange {
    Applied,
    NoOp,
}

/// Everything the repair layer needs from the photo host. Implemented by
/// [`RemoteClient`] over HTTP and by in-memory fakes in tests.
pub trait RemoteService {
    /// Whether the photo still exists (deleted photos return false, not an error).
    fn photo_exists(&mut self, photo_id: &str) -> Result<bool, RemoteError>;
    fn engagement(&mut self, photo_id: &str) -> Result<Engagement, RemoteError>;
    fn favorites_count(&mut self, photo_id: &str) -> Result<u64, RemoteError>;
    fn account_photos(&mut self) -> Result<Vec<RemoteRecord>, RemoteError>;
    /// Photo ids in an album, in album order.
    fn album_photos(&mut self, album_id: &str) -> Result<Vec<String>, RemoteError>;
    fn albums(&mut self) -> Result<Vec<AlbumInfo>, RemoteError>;
    /// Create an album; the host requires a primary photo at creation time.
    fn create_album(&mut self, title: &str, primary_photo: &str) -> Result<String, RemoteError>;
    fn add_to_album(&mut self, album_id: &str, photo_id: &str)
        -> Result<AlbumChange, RemoteError>;
    fn remove_from_album(
        &mut self,
        album_id: &str,
        photo_id: &str,
    ) -> Result<AlbumChange, RemoteError>;
    /// Replace the photo's title. An empty title clears it.
    fn set_title(&mut self, photo_id: &str, title: &str) -> Result<(), RemoteError>;
    fn delete_photo(&mut self, photo_id: &str) -> Result<(), RemoteError>;
}
