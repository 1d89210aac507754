//! JSON persistence codec.
//!
//! The on-disk document is a JSON array of user objects:
//!
//! ```json
//! [
//!   {
//!     "id": "0192…",
//!     "name": "Alex",
//!     "location_name": "Brisbane",
//!     "location": { "lat": -27.47, "long": 153.02 },
//!     "photo": "alex.png",
//!     "skills": ["Guitar"],
//!     "interests": []
//!   }
//! ]
//! ```
//!
//! Older documents wrapped the array as `{"users": [...]}` and stored
//! skills as `{"name": ...}` objects; both are still accepted on read.
//! Writes always go through a temporary file in the target directory that
//! is renamed over the target, so a partially written document is never
//! visible at the data path.

use std::io::Write;
use std::path::Path;

use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::user::UserRecord;

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Users(Vec<UserRecord>),
    Wrapped { users: Vec<UserRecord> },
}

/// Render `users` as compact JSON.
pub fn encode(users: &[UserRecord]) -> StoreResult<String> {
    serde_json::to_string(users).map_err(StoreError::Serialize)
}

/// Render `users` as indented JSON (the on-disk form).
pub fn encode_pretty(users: &[UserRecord]) -> StoreResult<String> {
    serde_json::to_string_pretty(users).map_err(StoreError::Serialize)
}

/// Parse a store document.
///
/// Blank input decodes to an empty collection; anything else must be a
/// well-formed document or [`StoreError::Parse`] is returned.
pub fn decode(text: &str) -> StoreResult<Vec<UserRecord>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Document = serde_json::from_str(text).map_err(StoreError::Parse)?;
    Ok(match doc {
        Document::Users(users) | Document::Wrapped { users } => users,
    })
}

/// Load the document at `path`. A missing file is an empty store.
pub fn read_file(path: &Path) -> StoreResult<Vec<UserRecord>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "data file absent, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StoreError::Io(e)),
    };
    let users = decode(&text)?;
    debug!(path = %path.display(), users = users.len(), "data file loaded");
    Ok(users)
}

/// Atomically replace the document at `path` with `users`.
pub fn write_atomic(path: &Path, users: &[UserRecord]) -> StoreResult<()> {
    let json = encode_pretty(users)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    info!(path = %path.display(), users = users.len(), bytes = json.len(), "store persisted");
    Ok(())
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Location;

    fn sample() -> Vec<UserRecord> {
        vec![
            UserRecord::builder("Alex")
                .location_name("Brisbane")
                .location(Location::new(-27.47, 153.02))
                .photo("alex.png")
                .skills(["Guitar"])
                .interests(["Surfing"])
                .build(),
            UserRecord::builder("Ben").skills(["Surfing"]).build(),
        ]
    }

    #[test]
    fn encode_emits_array_of_user_objects() {
        let users = sample();
        let value: serde_json::Value = serde_json::from_str(&encode(&users).unwrap()).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["name"], "Alex");
        assert_eq!(arr[0]["skills"], serde_json::json!(["Guitar"]));
        assert_eq!(arr[0]["interests"], serde_json::json!(["Surfing"]));
        assert_eq!(arr[0]["location"]["lat"], -27.47);
        assert_eq!(arr[0]["photo"], "alex.png");
        assert!(arr[1]["location"].is_null());
        assert_eq!(arr[1]["id"], users[1].id.as_str());
    }

    #[test]
    fn decode_reproduces_encoded_users() {
        let users = sample();
        let decoded = decode(&encode_pretty(&users).unwrap()).unwrap();
        assert_eq!(decoded, users);
    }

    #[test]
    fn decode_accepts_wrapped_legacy_document() {
        let legacy = r#"{"users":[{"name":"AHHB","location_name":"Sydney",
            "location":{"lat":0.0,"long":0.0},"photo":"afilepath",
            "skills":[{"name":"skilla"},{"name":"skilld"}],
            "interests":[{"name":"skillb"}]}]}"#;
        let users = decode(legacy).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "AHHB");
        assert_eq!(users[0].skills.names(), vec!["skilla", "skilld"]);
        assert_eq!(users[0].interests.names(), vec!["skillb"]);
        assert!(!users[0].id.as_str().is_empty());
    }

    #[test]
    fn decode_rejects_malformed_json() {
        let err = decode("[{\"name\": ").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));

        let err = decode("42").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn blank_and_missing_files_are_empty() {
        assert!(decode("  \n").unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        assert!(read_file(&dir.path().join("nope.json")).unwrap().is_empty());
    }

    #[test]
    fn write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "stale").unwrap();

        let users = sample();
        write_atomic(&path, &users).unwrap();
        assert_eq!(read_file(&path).unwrap(), users);

        // Only the data file remains; the temporary was renamed over it.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
