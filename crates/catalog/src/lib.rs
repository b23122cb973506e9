//! `lenslink-catalog` — catalog collaborator.
//!
//! Wraps the desktop catalog's SQLite file: published-record queries, link
//! rewrites, the uniqueness-safe swap, and embedded metadata retrieval. The
//! catalog application must be closed while this runs; multi-step writes are
//! wrapped in transactions so no partial state is ever observable.

pub mod xmp;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};

use lenslink_recon::model::LocalRecord;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum CatalogError {
    /// Cannot open the catalog file.
    Open(String),
    /// SQL execution error.
    Sql(String),
    /// A referenced row does not exist.
    NotFound(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "cannot open catalog: {msg}"),
            Self::Sql(msg) => write!(f, "catalog SQL error: {msg}"),
            Self::NotFound(what) => write!(f, "not found in catalog: {what}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sql(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

const RECORD_COLUMNS: &str = "\
    images.id, images.global_id, images.capture_time, \
    library_files.base_name, \
    remote_links.remote_id, remote_links.url, \
    image_metadata.xmp";

/// Sentinel written mid-swap so two link rewrites never collide on the
/// UNIQUE remote_id constraint.
const SWAP_SENTINEL: &str = "0";

pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Open(e.to_string()))?;
        Ok(Self { conn })
    }

    /// In-memory catalog for tests and dry experiments.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory().map_err(|e| CatalogError::Open(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Records published to the managed album, identified by the album id
    /// embedded in the derived URL. With `deep`, decode each record's
    /// metadata blob for the document id and a capture-time fallback.
    pub fn published_records(
        &self,
        album_id: &str,
        deep: bool,
    ) -> Result<Vec<LocalRecord>, CatalogError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM images
             JOIN library_files ON images.root_file = library_files.id
             JOIN remote_links ON remote_links.image = images.id
             LEFT JOIN image_metadata ON image_metadata.image = images.id
             WHERE remote_links.url LIKE ?1"
        );
        let pattern = format!("%/in/album-{album_id}%");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern], |row| row_to_record(row, deep))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every record in the catalog, published or not.
    pub fn all_records(&self, deep: bool) -> Result<Vec<LocalRecord>, CatalogError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM images
             JOIN library_files ON images.root_file = library_files.id
             LEFT JOIN remote_links ON remote_links.image = images.id
             LEFT JOIN image_metadata ON image_metadata.image = images.id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row_to_record(row, deep))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn record_by_remote_id(&self, remote_id: &str) -> Result<Option<LocalRecord>, CatalogError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM images
             JOIN library_files ON images.root_file = library_files.id
             JOIN remote_links ON remote_links.image = images.id
             LEFT JOIN image_metadata ON image_metadata.image = images.id
             WHERE remote_links.remote_id = ?1"
        );
        self.conn
            .query_row(&sql, params![remote_id], |row| row_to_record(row, false))
            .optional()
            .map_err(Into::into)
    }

    pub fn record_by_local_id(&self, local_id: i64) -> Result<Option<LocalRecord>, CatalogError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM images
             JOIN library_files ON images.root_file = library_files.id
             LEFT JOIN remote_links ON remote_links.image = images.id
             LEFT JOIN image_metadata ON image_metadata.image = images.id
             WHERE images.id = ?1"
        );
        self.conn
            .query_row(&sql, params![local_id], |row| row_to_record(row, false))
            .optional()
            .map_err(Into::into)
    }

    /// All remote ids the catalog currently links to.
    pub fn linked_remote_ids(&self) -> Result<HashSet<String>, CatalogError> {
        let mut stmt = self
            .conn
            .prepare("SELECT remote_id FROM remote_links WHERE remote_id IS NOT NULL")?;
        let ids = stmt.query_map([], |row| row.get::<_, String>(0))?;
        ids.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }

    /// Rewrite the authoritative link `from` → `to`, fix the derived URL in
    /// place, and mark the record dirty for re-sync. Returns the number of
    /// rows touched (0 when `from` is not linked — callers decide whether
    /// that is a precondition failure).
    pub fn repoint(&self, from: &str, to: &str) -> Result<usize, CatalogError> {
        let n = self.conn.execute(
            "UPDATE remote_links
             SET remote_id = ?2, url = REPLACE(url, ?1, ?2), needs_sync = 1
             WHERE remote_id = ?1",
            params![from, to],
        )?;
        Ok(n)
    }

    /// Swap the remote links of the rows currently holding `a` and `b`.
    ///
    /// remote_id is UNIQUE, so both final values cannot be written directly:
    /// one side is first cleared to a sentinel, then the second side gets its
    /// final value, then the first. The whole sequence runs in one
    /// transaction — a crash mid-swap leaves the catalog untouched.
    pub fn swap_links(&mut self, a: &str, b: &str) -> Result<(), CatalogError> {
        let row_a = self.link_row(a)?;
        let row_b = self.link_row(b)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE remote_links SET remote_id = ?1 WHERE id = ?2",
            params![SWAP_SENTINEL, row_a.0],
        )?;
        tx.execute(
            "UPDATE remote_links SET remote_id = ?1, url = ?2, needs_sync = 1 WHERE id = ?3",
            params![a, row_a.1, row_b.0],
        )?;
        tx.execute(
            "UPDATE remote_links SET remote_id = ?1, url = ?2, needs_sync = 1 WHERE id = ?3",
            params![b, row_b.1, row_a.0],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Raw embedded-metadata blob for a record, when present.
    pub fn metadata_blob(&self, local_id: i64) -> Result<Option<Vec<u8>>, CatalogError> {
        self.conn
            .query_row(
                "SELECT xmp FROM image_metadata WHERE image = ?1",
                params![local_id],
                |row| row.get::<_, Option<Vec<u8>>>(0),
            )
            .optional()
            .map(Option::flatten)
            .map_err(Into::into)
    }

    /// Derive the managed album id from the URL stored for a linked record.
    pub fn managed_album_id(&self, remote_id: &str) -> Result<Option<String>, CatalogError> {
        let url: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT url FROM remote_links WHERE remote_id = ?1",
                params![remote_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(Some(url)) = url else {
            return Ok(None);
        };
        let re = Regex::new(r"/in/album-(\w+)").unwrap();
        Ok(re
            .captures(&url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()))
    }

    /// (remote_links.id, url) for the row holding `remote_id`.
    fn link_row(&self, remote_id: &str) -> Result<(i64, Option<String>), CatalogError> {
        self.conn
            .query_row(
                "SELECT id, url FROM remote_links WHERE remote_id = ?1",
                params![remote_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| CatalogError::NotFound(format!("remote link {remote_id}")))
    }
}

fn row_to_record(row: &rusqlite::Row<'_>, deep: bool) -> Result<LocalRecord, rusqlite::Error> {
    let blob: Option<Vec<u8>> = row.get(6)?;
    let mut record = LocalRecord {
        local_id: row.get(0)?,
        global_id: row.get(1)?,
        capture_time: row.get(2)?,
        file_name: row.get(3)?,
        remote_id: row.get(4)?,
        url: row.get(5)?,
        document_id: None,
    };
    if deep {
        if let Some(blob) = blob {
            let fields = xmp::extract(&blob);
            record.document_id = fields.document_id;
            if record.capture_time.is_none() {
                record.capture_time = fields.capture_time;
            }
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The catalog application owns the schema; tests recreate the slice this
    // crate touches, including the UNIQUE constraint that motivates the
    // sentinel swap.
    const TEST_SCHEMA: &str = "
        CREATE TABLE images (
            id INTEGER PRIMARY KEY,
            global_id TEXT NOT NULL,
            root_file INTEGER NOT NULL,
            capture_time TEXT
        );
        CREATE TABLE library_files (
            id INTEGER PRIMARY KEY,
            base_name TEXT NOT NULL,
            extension TEXT
        );
        CREATE TABLE remote_links (
            id INTEGER PRIMARY KEY,
            image INTEGER NOT NULL,
            remote_id TEXT UNIQUE,
            url TEXT,
            needs_sync REAL DEFAULT 0
        );
        CREATE TABLE image_metadata (
            id INTEGER PRIMARY KEY,
            image INTEGER NOT NULL,
            xmp BLOB
        );
    ";

    fn test_catalog() -> Catalog {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.conn.execute_batch(TEST_SCHEMA).unwrap();
        catalog
    }

    fn insert_photo(catalog: &Catalog, id: i64, name: &str, remote_id: Option<&str>) {
        catalog
            .conn
            .execute(
                "INSERT INTO library_files (id, base_name, extension) VALUES (?1, ?2, 'jpg')",
                params![id, name],
            )
            .unwrap();
        catalog
            .conn
            .execute(
                "INSERT INTO images (id, global_id, root_file, capture_time)
                 VALUES (?1, ?2, ?1, '2014-04-13T13:33:40')",
                params![id, format!("uuid-{id}")],
            )
            .unwrap();
        if let Some(rid) = remote_id {
            catalog
                .conn
                .execute(
                    "INSERT INTO remote_links (image, remote_id, url)
                     VALUES (?1, ?2, ?3)",
                    params![
                        id,
                        rid,
                        format!("https://photos.example.com/p/{rid}/in/album-777")
                    ],
                )
                .unwrap();
        }
    }

    #[test]
    fn published_records_filter_on_album() {
        let catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("r1"));
        insert_photo(&catalog, 2, "IMG_0002", None);

        let records = catalog.published_records("777", false).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].local_id, 1);
        assert_eq!(records[0].remote_id.as_deref(), Some("r1"));
        assert_eq!(records[0].file_name.as_deref(), Some("IMG_0001"));

        assert!(catalog.published_records("999", false).unwrap().is_empty());
        assert_eq!(catalog.all_records(false).unwrap().len(), 2);
    }

    #[test]
    fn repoint_rewrites_link_url_and_dirty_flag() {
        let catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("goner"));

        let touched = catalog.repoint("goner", "keeper").unwrap();
        assert_eq!(touched, 1);

        let record = catalog.record_by_remote_id("keeper").unwrap().unwrap();
        assert_eq!(
            record.url.as_deref(),
            Some("https://photos.example.com/p/keeper/in/album-777")
        );
        assert!(catalog.record_by_remote_id("goner").unwrap().is_none());

        let dirty: f64 = catalog
            .conn
            .query_row(
                "SELECT needs_sync FROM remote_links WHERE remote_id = 'keeper'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(dirty, 1.0);
    }

    #[test]
    fn repoint_missing_link_touches_nothing() {
        let catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("r1"));
        assert_eq!(catalog.repoint("absent", "keeper").unwrap(), 0);
    }

    #[test]
    fn swap_exchanges_links_and_urls() {
        let mut catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("r1"));
        insert_photo(&catalog, 2, "IMG_0002", Some("r2"));

        catalog.swap_links("r1", "r2").unwrap();

        let one = catalog.record_by_local_id(1).unwrap().unwrap();
        let two = catalog.record_by_local_id(2).unwrap().unwrap();
        assert_eq!(one.remote_id.as_deref(), Some("r2"));
        assert_eq!(two.remote_id.as_deref(), Some("r1"));
        assert_eq!(
            one.url.as_deref(),
            Some("https://photos.example.com/p/r2/in/album-777")
        );
        assert_eq!(
            two.url.as_deref(),
            Some("https://photos.example.com/p/r1/in/album-777")
        );
    }

    #[test]
    fn swap_with_unknown_id_fails_before_writing() {
        let mut catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("r1"));

        let err = catalog.swap_links("r1", "ghost").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));

        // Nothing was cleared.
        let record = catalog.record_by_local_id(1).unwrap().unwrap();
        assert_eq!(record.remote_id.as_deref(), Some("r1"));
    }

    #[test]
    fn deep_records_decode_the_metadata_blob() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("r1"));

        let packet = r#"<rdf:Description xmpMM:DocumentID="xmp.did:FEED01"/>"#;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(packet.as_bytes()).unwrap();
        let mut blob = (packet.len() as u32).to_be_bytes().to_vec();
        blob.extend_from_slice(&encoder.finish().unwrap());
        catalog
            .conn
            .execute(
                "INSERT INTO image_metadata (image, xmp) VALUES (1, ?1)",
                params![blob],
            )
            .unwrap();

        let shallow = catalog.published_records("777", false).unwrap();
        assert_eq!(shallow[0].document_id, None);

        let deep = catalog.published_records("777", true).unwrap();
        assert_eq!(deep[0].document_id.as_deref(), Some("xmp.did:FEED01"));

        let raw = catalog.metadata_blob(1).unwrap().unwrap();
        assert_eq!(xmp::extract(&raw).document_id.as_deref(), Some("xmp.did:FEED01"));
        assert_eq!(catalog.metadata_blob(2).unwrap(), None);
    }

    #[test]
    fn managed_album_id_comes_from_the_url() {
        let catalog = test_catalog();
        insert_photo(&catalog, 1, "IMG_0001", Some("r1"));
        assert_eq!(
            catalog.managed_album_id("r1").unwrap().as_deref(),
            Some("777")
        );
        assert_eq!(catalog.managed_album_id("absent").unwrap(), None);
    }
}
