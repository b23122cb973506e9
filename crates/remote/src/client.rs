//! Blocking HTTP implementation of [`RemoteService`].

use std::time::Duration;

use lenslink_recon::RemoteRecord;

use crate::auth::{load_auth, AuthCredentials};
use crate::{AlbumChange, AlbumInfo, Engagement, RemoteError, RemoteService};

/// One inventory page. Large accounts run to tens of thousands of photos;
/// the host caps page size at 500.
const PER_PAGE: usize = 500;

/// Photo host API client (blocking).
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl RemoteClient {
    /// Create a new client using saved auth credentials.
    pub fn from_saved_auth() -> Result<Self, RemoteError> {
        let creds = load_auth().ok_or(RemoteError::NotAuthenticated)?;
        Ok(Self::new(creds))
    }

    /// Create a new client with explicit credentials.
    pub fn new(creds: AuthCredentials) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("lenslink/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: creds.api_base,
            token: creds.token,
        }
    }

    /// Verify the current token and return the account name.
    pub fn verify_token(&self) -> Result<String, RemoteError> {
        let url = format!("{}/api/me", self.api_base);
        let json: serde_json::Value = self
            .get(&url)?
            .json()
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        json["account"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| RemoteError::Parse("Missing account in response".into()))
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, RemoteError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response, RemoteError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        check_status(response)
    }

    /// Walk a paginated listing, collecting `json[items_key]` arrays until
    /// the reported page count runs out.
    fn paged(&self, url: &str, items_key: &str) -> Result<Vec<serde_json::Value>, RemoteError> {
        let mut items = Vec::new();
        let mut page = 1usize;
        loop {
            let page_url = format!("{}?page={}&per_page={}", url, page, PER_PAGE);
            let json: serde_json::Value = self
                .get(&page_url)?
                .json()
                .map_err(|e| RemoteError::Parse(e.to_string()))?;

            if let Some(arr) = json[items_key].as_array() {
                items.extend(arr.iter().cloned());
            }

            let pages = json["pages"].as_u64().unwrap_or(1) as usize;
            if page >= pages {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, RemoteError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(RemoteError::Validation(body));
        }
        return Err(RemoteError::Http(status, body));
    }
    Ok(response)
}

fn record_from_json(p: &serde_json::Value) -> Option<RemoteRecord> {
    Some(RemoteRecord {
        id: p["id"]
            .as_str()
            .map(String::from)
            .or_else(|| p["id"].as_i64().map(|n| n.to_string()))?,
        title: p["title"].as_str().unwrap_or("").to_string(),
        taken: p["taken"].as_str().map(String::from),
        views: p["views"].as_u64().unwrap_or(0),
        comments: p["comments"].as_u64().unwrap_or(0),
        favorites: p["favorites"].as_u64(),
        document_id: p["document_id"].as_str().map(String::from),
    })
}

impl RemoteService for RemoteClient {
    fn photo_exists(&mut self, photo_id: &str) -> Result<bool, RemoteError> {
        let url = format!("{}/api/photos/{}", self.api_base, photo_id);
        match self.get(&url) {
            Ok(_) => Ok(true),
            Err(RemoteError::Http(404, _)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn engagement(&mut self, photo_id: &str) -> Result<Engagement, RemoteError> {
        let url = format!("{}/api/photos/{}", self.api_base, photo_id);
        let json: serde_json::Value = self
            .get(&url)?
            .json()
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        Ok(Engagement {
            views: json["views"].as_u64().unwrap_or(0),
            comments: json["comments"].as_u64().unwrap_or(0),
            favorites: json["favorites"].as_u64().unwrap_or(0),
        })
    }

    fn favorites_count(&mut self, photo_id: &str) -> Result<u64, RemoteError> {
        let url = format!("{}/api/photos/{}/favorites/count", self.api_base, photo_id);
        let json: serde_json::Value = self
            .get(&url)?
            .json()
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        json["count"]
            .as_u64()
            .ok_or_else(|| RemoteError::Parse("Missing count in response".into()))
    }

    fn account_photos(&mut self) -> Result<Vec<RemoteRecord>, RemoteError> {
        let url = format!("{}/api/photos", self.api_base);
        let items = self.paged(&url, "photos")?;
        Ok(items.iter().filter_map(record_from_json).collect())
    }

    fn album_photos(&mut self, album_id: &str) -> Result<Vec<String>, RemoteError> {
        let url = format!("{}/api/albums/{}/photos", self.api_base, album_id);
        let items = self.paged(&url, "photos")?;
        Ok(items
            .iter()
            .filter_map(|p| {
                p["id"]
                    .as_str()
                    .map(String::from)
                    .or_else(|| p["id"].as_i64().map(|n| n.to_string()))
            })
            .collect())
    }

    fn albums(&mut self) -> Result<Vec<AlbumInfo>, RemoteError> {
        let url = format!("{}/api/albums", self.api_base);
        let items = self.paged(&url, "albums")?;
        Ok(items
            .iter()
            .filter_map(|a| {
                Some(AlbumInfo {
                    id: a["id"]
                        .as_str()
                        .map(String::from)
                        .or_else(|| a["id"].as_i64().map(|n| n.to_string()))?,
                    title: a["title"].as_str()?.to_string(),
                })
            })
            .collect())
    }

    fn create_album(&mut self, title: &str, primary_photo: &str) -> Result<String, RemoteError> {
        let url = format!("{}/api/albums", self.api_base);
        let body = serde_json::json!({ "title": title, "primary_photo": primary_photo });
        let json: serde_json::Value = self
            .post_json(&url, &body)?
            .json()
            .map_err(|e| RemoteError::Parse(e.to_string()))?;
        json["id"]
            .as_str()
            .map(String::from)
            .or_else(|| json["id"].as_i64().map(|n| n.to_string()))
            .ok_or_else(|| RemoteError::Parse("Missing id in response".into()))
    }

    fn add_to_album(
        &mut self,
        album_id: &str,
        photo_id: &str,
    ) -> Result<AlbumChange, RemoteError> {
        let url = format!("{}/api/albums/{}/photos/{}", self.api_base, album_id, photo_id);
        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        // Already a member: the album is in the requested state.
        if response.status().as_u16() == 409 {
            return Ok(AlbumChange::NoOp);
        }
        check_status(response)?;
        Ok(AlbumChange::Applied)
    }

    fn remove_from_album(
        &mut self,
        album_id: &str,
        photo_id: &str,
    ) -> Result<AlbumChange, RemoteError> {
        let url = format!("{}/api/albums/{}/photos/{}", self.api_base, album_id, photo_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        // Not a member: the album is in the requested state.
        if response.status().as_u16() == 404 {
            return Ok(AlbumChange::NoOp);
        }
        check_status(response)?;
        Ok(AlbumChange::Applied)
    }

    fn set_title(&mut self, photo_id: &str, title: &str) -> Result<(), RemoteError> {
        let url = format!("{}/api/photos/{}", self.api_base, photo_id);
        let body = serde_json::json!({ "title": title });
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        check_status(response)?;
        Ok(())
    }

    fn delete_photo(&mut self, photo_id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/api/photos/{}", self.api_base, photo_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        check_status(response)?;
        Ok(())
    }
}
