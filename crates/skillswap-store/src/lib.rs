//! # skillswap-store
//!
//! Durable user/skill registry for SkillSwap.
//!
//! Users offer skills and want skills (interests). The registry keeps an
//! ordered collection of user records in memory, bound to a JSON file that
//! is rewritten atomically on every write-through mutation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  UserStore (Arc<Mutex<>>, write-through) │
//! ├─────────────────────────────────────────┤
//! │  UserRecord (id, name, location, sets)   │
//! │  SkillSet / Skill (value equality)       │
//! ├─────────────────────────────────────────┤
//! │  codec (JSON array, temp file + rename)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use skillswap_store::{Location, Skill, UserRecord, UserStore};
//!
//! # fn main() -> skillswap_store::StoreResult<()> {
//! let store = UserStore::open("store.json")?;
//! let alex = UserRecord::new("Alex", "Brisbane", Location::new(-27.47, 153.02), "");
//! store.register_user(alex.clone())?;
//! store.add_skill_and_write(&alex.id, Skill::new("Guitar"))?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod skill;
pub mod user;
pub mod user_store;

// ── re-exports ───────────────────────────────────────────────────────

pub use error::{StoreError, StoreResult};
pub use skill::{Skill, SkillKind, SkillSet};
pub use user::{Location, UserId, UserRecord, UserRecordBuilder};
pub use user_store::UserStore;
