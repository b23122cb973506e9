//! Account inventory with an on-disk JSONL cache.
//!
//! A full listing is thousands of requests' worth of pages, so audits reuse
//! a cached listing (one JSON record per line) unless asked to refresh.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use lenslink_recon::RemoteRecord;

use crate::{RemoteError, RemoteService};

/// Load a cached inventory. Blank lines are skipped; a malformed line is a
/// parse error, not silently dropped, since a partial inventory would make
/// healthy links look stale.
pub fn load_cache(path: &Path) -> Result<Vec<RemoteRecord>, RemoteError> {
    let file = std::fs::File::open(path).map_err(|e| RemoteError::Io(e.to_string()))?;
    let mut records = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| RemoteError::Io(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RemoteRecord = serde_json::from_str(&line)
            .map_err(|e| RemoteError::Parse(format!("line {}: {}", n + 1, e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Write an inventory cache, one record per line.
pub fn save_cache(path: &Path, records: &[RemoteRecord]) -> Result<(), RemoteError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RemoteError::Io(e.to_string()))?;
    }
    let mut file = std::fs::File::create(path).map_err(|e| RemoteError::Io(e.to_string()))?;
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|e| RemoteError::Parse(e.to_string()))?;
        writeln!(file, "{}", line).map_err(|e| RemoteError::Io(e.to_string()))?;
    }
    Ok(())
}

/// Fetch the full account listing and rewrite the cache.
pub fn refresh(
    service: &mut dyn RemoteService,
    cache_path: &Path,
) -> Result<Vec<RemoteRecord>, RemoteError> {
    let records = service.account_photos()?;
    save_cache(cache_path, &records)?;
    Ok(records)
}

/// Cached inventory if present, otherwise a fresh fetch (which seeds the cache).
pub fn load_or_fetch(
    service: &mut dyn RemoteService,
    cache_path: &Path,
) -> Result<Vec<RemoteRecord>, RemoteError> {
    if cache_path.exists() {
        load_cache(cache_path)
    } else {
        refresh(service, cache_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, views: u64) -> RemoteRecord {
        RemoteRecord {
            id: id.into(),
            title: format!("photo {id}"),
            taken: Some("2014-04-13 13:33:40".into()),
            views,
            comments: 0,
            favorites: None,
            document_id: None,
        }
    }

    #[test]
    fn cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.jsonl");

        let records = vec![record("a", 10), record("b", 0)];
        save_cache(&path, &records).unwrap();

        let loaded = load_cache(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "a");
        assert_eq!(loaded[0].views, 10);
        assert_eq!(loaded[1].id, "b");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.jsonl");
        let line = serde_json::to_string(&record("a", 1)).unwrap();
        std::fs::write(&path, format!("{line}\n\n{line}\n")).unwrap();

        let loaded = load_cache(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        let err = load_cache(&path).unwrap_err();
        assert!(matches!(err, RemoteError::Parse(_)));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn missing_cache_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cache(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, RemoteError::Io(_)));
    }
}
