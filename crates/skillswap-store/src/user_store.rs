//! The file-backed user/skill registry.
//!
//! [`UserStore`] wraps the in-memory collection and its bound data path
//! behind an `Arc<Mutex<>>`. Every operation holds the lock for its whole
//! duration, so a read-modify-write-then-persist sequence can never
//! interleave with another one and corrupt the file.
//!
//! Two ways to add data:
//!
//! - **Staging** ([`UserStore::register_user`]) puts a record in memory
//!   only. It shows up in [`UserStore::to_json`] but not on disk.
//! - **Write-through** (the `*_and_write` methods) mutates a registered
//!   user and then atomically rewrites the whole collection to the data
//!   path before returning.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, instrument, warn};

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::skill::{Skill, SkillKind};
use crate::user::{UserId, UserRecord};

#[derive(Debug, Default)]
struct StoreState {
    data_path: Option<PathBuf>,
    users: Vec<UserRecord>,
}

/// Thread-safe handle to the registry. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    state: Arc<Mutex<StoreState>>,
}

impl UserStore {
    /// Create an unbound, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store bound to `path`, loading any existing content.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let store = Self::new();
        store.set_data_path(path)?;
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }

    // ── binding ──────────────────────────────────────────────────────

    /// Bind the store to `path` and load what is already there.
    ///
    /// Rebinding discards the in-memory collection and replaces it with
    /// the new file's content; nothing is migrated. On failure the previous
    /// binding and content are kept.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn set_data_path(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        check_writable(path)?;
        let users = codec::read_file(path)?;

        let mut state = self.lock()?;
        if let Some(previous) = state.data_path.as_ref().filter(|p| p.as_path() != path) {
            info!(
                previous = %previous.display(),
                dropped = state.users.len(),
                "rebinding store to a new data path"
            );
        }
        state.data_path = Some(path.to_path_buf());
        state.users = users;
        info!(users = state.users.len(), "data path bound");
        Ok(())
    }

    /// The currently bound data path, if any.
    pub fn data_path(&self) -> StoreResult<Option<PathBuf>> {
        Ok(self.lock()?.data_path.clone())
    }

    // ── staging ──────────────────────────────────────────────────────

    /// Register `record` in memory without persisting it.
    ///
    /// Registering a record whose id is already present replaces that entry
    /// in place.
    #[instrument(skip(self, record), fields(user_id = %record.id, name = %record.name))]
    pub fn register_user(&self, record: UserRecord) -> StoreResult<()> {
        let mut state = self.lock()?;
        match state.users.iter_mut().find(|u| u.id == record.id) {
            Some(existing) => {
                debug!("user re-registered, replacing staged copy");
                *existing = record;
            }
            None => {
                debug!("user staged");
                state.users.push(record);
            }
        }
        Ok(())
    }

    /// Register `record`, or adopt the stored record that already carries
    /// its display name.
    ///
    /// A matching id replaces the entry as in [`register_user`]. Otherwise,
    /// if a user with the same name is already stored (typically loaded
    /// from the data file by an earlier process), nothing is added and the
    /// stored record is returned so the caller can take over its identity.
    /// Returns the record the store now holds for this user.
    ///
    /// [`register_user`]: UserStore::register_user
    #[instrument(skip(self, record), fields(user_id = %record.id, name = %record.name))]
    pub fn register_or_adopt(&self, record: UserRecord) -> StoreResult<UserRecord> {
        let mut state = self.lock()?;
        if let Some(existing) = state.users.iter_mut().find(|u| u.id == record.id) {
            debug!("user re-registered, replacing staged copy");
            *existing = record.clone();
            return Ok(record);
        }
        if let Some(existing) = state.users.iter().find(|u| u.name == record.name) {
            info!(stored_id = %existing.id, "name already registered, adopting stored record");
            return Ok(existing.clone());
        }
        debug!("user staged");
        state.users.push(record.clone());
        Ok(record)
    }

    // ── write-through ────────────────────────────────────────────────

    /// Add an offered skill to `user_id` and persist.
    pub fn add_skill_and_write(&self, user_id: &UserId, skill: Skill) -> StoreResult<UserRecord> {
        self.mutate_and_write(user_id, SkillKind::Offered, |user| {
            user.add(SkillKind::Offered, skill)
        })
    }

    /// Add a wanted skill to `user_id` and persist.
    pub fn add_interest_and_write(&self, user_id: &UserId, skill: Skill) -> StoreResult<UserRecord> {
        self.mutate_and_write(user_id, SkillKind::Wanted, |user| {
            user.add(SkillKind::Wanted, skill)
        })
    }

    /// Remove the offered skill named `name` from `user_id` and persist.
    pub fn remove_skill_and_write(&self, user_id: &UserId, name: &str) -> StoreResult<UserRecord> {
        self.mutate_and_write(user_id, SkillKind::Offered, |user| {
            user.remove(SkillKind::Offered, name)
        })
    }

    /// Remove the wanted skill named `name` from `user_id` and persist.
    pub fn remove_interest_and_write(
        &self,
        user_id: &UserId,
        name: &str,
    ) -> StoreResult<UserRecord> {
        self.mutate_and_write(user_id, SkillKind::Wanted, |user| {
            user.remove(SkillKind::Wanted, name)
        })
    }

    /// Persist the current collection as-is.
    #[instrument(skip(self))]
    pub fn flush(&self) -> StoreResult<()> {
        let state = self.lock()?;
        let path = state.data_path.as_deref().ok_or(StoreError::NoDataPath)?;
        codec::write_atomic(path, &state.users)
    }

    /// Apply `mutate` to a working copy, persist it, then commit it.
    ///
    /// The in-memory collection only changes once the write has succeeded,
    /// so a failed write leaves memory and disk at the previous state.
    #[instrument(skip(self, mutate), fields(user_id = %user_id, %kind))]
    fn mutate_and_write<F>(
        &self,
        user_id: &UserId,
        kind: SkillKind,
        mutate: F,
    ) -> StoreResult<UserRecord>
    where
        F: FnOnce(&mut UserRecord) -> bool,
    {
        let mut state = self.lock()?;
        let path = state.data_path.clone().ok_or(StoreError::NoDataPath)?;
        let index = state
            .users
            .iter()
            .position(|u| &u.id == user_id)
            .ok_or_else(|| StoreError::UserNotFound {
                id: user_id.to_string(),
            })?;

        let mut users = state.users.clone();
        let changed = mutate(&mut users[index]);
        if !changed {
            debug!("set unchanged, persisting anyway");
        }

        if let Err(e) = codec::write_atomic(&path, &users) {
            warn!(error = %e, "persist failed, in-memory state left unchanged");
            return Err(e);
        }

        let updated = users[index].clone();
        state.users = users;
        Ok(updated)
    }

    // ── queries ──────────────────────────────────────────────────────

    /// Snapshot of all users in registration order.
    pub fn users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.lock()?.users.clone())
    }

    /// Look up a user by id.
    pub fn get(&self, user_id: &UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.lock()?.users.iter().find(|u| &u.id == user_id).cloned())
    }

    /// First user with display name `name`.
    pub fn find_by_name(&self, name: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.lock()?.users.iter().find(|u| u.name == name).cloned())
    }

    /// Users offering the skill named `skill`.
    pub fn offering(&self, skill: &str) -> StoreResult<Vec<UserRecord>> {
        self.filter(|u| u.skills.contains(skill))
    }

    /// Users wanting the skill named `skill`.
    pub fn wanting(&self, skill: &str) -> StoreResult<Vec<UserRecord>> {
        self.filter(|u| u.interests.contains(skill))
    }

    /// Users who offer `wanted` and in return want `offered`.
    pub fn swap_partners(&self, offered: &str, wanted: &str) -> StoreResult<Vec<UserRecord>> {
        self.filter(|u| u.skills.contains(wanted) && u.interests.contains(offered))
    }

    fn filter<P>(&self, predicate: P) -> StoreResult<Vec<UserRecord>>
    where
        P: Fn(&UserRecord) -> bool,
    {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| predicate(*u))
            .cloned()
            .collect())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.users.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.users.is_empty())
    }

    /// Render the in-memory collection (staged users included) as JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        codec::encode(&self.lock()?.users)
    }
}

/// Check that `path` can be written, or created if it does not exist yet.
fn check_writable(path: &Path) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if path.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(invalid("path is a directory")),
        Ok(_) => OpenOptions::new()
            .append(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| invalid(&format!("not writable: {e}"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            match std::fs::metadata(parent) {
                Ok(meta) if !meta.is_dir() => Err(invalid("parent is not a directory")),
                Ok(meta) if meta.permissions().readonly() => {
                    Err(invalid("parent directory is read-only"))
                }
                Ok(_) => Ok(()),
                Err(e) => Err(invalid(&format!("parent directory unavailable: {e}"))),
            }
        }
        Err(e) => Err(invalid(&e.to_string())),
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_store() -> (tempfile::TempDir, PathBuf, UserStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = UserStore::open(&path).unwrap();
        (dir, path, store)
    }

    #[test]
    fn write_before_binding_fails() {
        let store = UserStore::new();
        let user = UserRecord::builder("Alex").build();
        store.register_user(user.clone()).unwrap();

        let err = store
            .add_skill_and_write(&user.id, Skill::new("Guitar"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NoDataPath));
        assert!(matches!(store.flush().unwrap_err(), StoreError::NoDataPath));
    }

    #[test]
    fn binding_does_not_create_file() {
        let (_dir, path, store) = bound_store();
        assert!(!path.exists());
        assert_eq!(store.data_path().unwrap(), Some(path));
    }

    #[test]
    fn binding_rejects_directory_and_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::new();

        let err = store.set_data_path(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));

        let err = store
            .set_data_path(dir.path().join("missing").join("store.json"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));

        let err = store.set_data_path("").unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
        assert_eq!(store.data_path().unwrap(), None);
    }

    #[test]
    fn malformed_file_keeps_previous_binding() {
        let (dir, path, store) = bound_store();
        let user = UserRecord::builder("Alex").build();
        store.register_user(user).unwrap();

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = store.set_data_path(&bad).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
        assert_eq!(store.data_path().unwrap(), Some(path));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn register_replaces_same_id() {
        let store = UserStore::new();
        let mut user = UserRecord::builder("Alex").build();
        store.register_user(user.clone()).unwrap();
        user.add_skill(Skill::new("Guitar"));
        store.register_user(user.clone()).unwrap();

        let users = store.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].skills.names(), vec!["Guitar"]);
    }

    #[test]
    fn unknown_user_is_reported() {
        let (_dir, _path, store) = bound_store();
        let stranger = UserRecord::builder("Nobody").build();
        let err = store
            .remove_interest_and_write(&stranger.id, "Chess")
            .unwrap_err();
        assert!(matches!(err, StoreError::UserNotFound { .. }));
    }

    #[test]
    fn write_through_updates_memory_and_returns_record() {
        let (_dir, _path, store) = bound_store();
        let user = UserRecord::builder("Alex").build();
        store.register_user(user.clone()).unwrap();

        let updated = store
            .add_interest_and_write(&user.id, Skill::new("Surfing"))
            .unwrap();
        assert_eq!(updated.interests.names(), vec!["Surfing"]);
        let stored = store.get(&user.id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn swap_partner_queries() {
        let store = UserStore::new();
        for user in [
            UserRecord::builder("Alex").skills(["Chinese"]).interests(["Surfing"]).build(),
            UserRecord::builder("Ben").skills(["Surfing"]).interests(["Chinese"]).build(),
            UserRecord::builder("Casey").skills(["Graphic Design"]).interests(["French"]).build(),
        ] {
            store.register_user(user).unwrap();
        }

        let partners = store.swap_partners("Chinese", "Surfing").unwrap();
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].name, "Ben");

        assert_eq!(store.offering("Surfing").unwrap().len(), 1);
        assert_eq!(store.wanting("French").unwrap()[0].name, "Casey");
        assert!(store.find_by_name("Drew").unwrap().is_none());
    }

    #[test]
    fn register_or_adopt_reuses_stored_name() {
        let (_dir, path, store) = bound_store();
        let first = UserRecord::builder("AHHB").build();
        store.register_user(first.clone()).unwrap();
        store
            .add_skill_and_write(&first.id, Skill::new("skilla"))
            .unwrap();

        // Same name, new identity: what a second run of the host produces.
        let reloaded = UserStore::open(&path).unwrap();
        let again = UserRecord::builder("AHHB").location_name("Sydney").build();
        assert_ne!(again.id, first.id);

        let held = reloaded.register_or_adopt(again).unwrap();
        assert_eq!(held.id, first.id);
        assert_eq!(held.skills.names(), vec!["skilla"]);
        assert_eq!(reloaded.len().unwrap(), 1);

        let fresh = UserRecord::builder("Ben").build();
        let held = reloaded.register_or_adopt(fresh.clone()).unwrap();
        assert_eq!(held, fresh);
        assert_eq!(reloaded.len().unwrap(), 2);
    }

    #[test]
    fn failed_persist_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = UserStore::open(sub.join("store.json")).unwrap();

        let user = UserRecord::builder("Alex").build();
        store.register_user(user.clone()).unwrap();
        store
            .add_skill_and_write(&user.id, Skill::new("Guitar"))
            .unwrap();

        std::fs::remove_dir_all(&sub).unwrap();
        let err = store
            .add_skill_and_write(&user.id, Skill::new("Piano"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)), "{err:?}");

        let stored = store.get(&user.id).unwrap().unwrap();
        assert_eq!(stored.skills.names(), vec!["Guitar"]);
        assert!(stored.interests.is_empty());
    }
}
