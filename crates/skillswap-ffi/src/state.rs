//! Process-wide state behind the C boundary.

use std::sync::LazyLock;

use skillswap_store::{Skill, UserRecord, UserStore};

use crate::handle::{HandleKind, HandleTable};

/// Caller-owned skills.
pub(crate) static SKILLS: LazyLock<HandleTable<Skill>> =
    LazyLock::new(|| HandleTable::new(HandleKind::Skill));

/// Caller-owned user records (the store keeps its own copies).
pub(crate) static USERS: LazyLock<HandleTable<UserRecord>> =
    LazyLock::new(|| HandleTable::new(HandleKind::User));

/// The single registry all write-through calls go to.
pub(crate) static STORE: LazyLock<UserStore> = LazyLock::new(UserStore::new);
