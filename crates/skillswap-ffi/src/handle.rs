//! Generation-checked handle tables.
//!
//! Values handed to foreign callers live in a [`HandleTable`] and are
//! referred to by an opaque `u64`:
//!
//! ```text
//!  63      56 55              32 31               0
//! ┌─────────┬──────────────────┬──────────────────┐
//! │  tag    │   generation     │   slot index + 1 │
//! └─────────┴──────────────────┴──────────────────┘
//! ```
//!
//! `0` is the null handle. Freeing a slot bumps its generation, so a stale
//! handle (double free, use after free, reused slot) fails the generation
//! check and is reported instead of dereferenced. The tag rejects a handle
//! passed to the wrong table.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{FfiError, FfiResult};

const INDEX_MASK: u64 = 0xFFFF_FFFF;
const GENERATION_SHIFT: u32 = 32;
const GENERATION_MASK: u32 = 0x00FF_FFFF;
const TAG_SHIFT: u32 = 56;

/// Which table a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Skill,
    User,
}

impl HandleKind {
    fn tag(self) -> u64 {
        match self {
            Self::Skill => 0x5A,
            Self::User => 0x55,
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill => f.write_str("skill"),
            Self::User => f.write_str("user"),
        }
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

struct Slots<T> {
    entries: Vec<Slot<T>>,
    free: Vec<u32>,
}

/// Thread-safe arena of caller-owned values.
pub struct HandleTable<T> {
    kind: HandleKind,
    slots: Mutex<Slots<T>>,
}

impl<T> HandleTable<T> {
    /// Create an empty table for handles of `kind`.
    pub fn new(kind: HandleKind) -> Self {
        Self {
            kind,
            slots: Mutex::new(Slots {
                entries: Vec::new(),
                free: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> FfiResult<MutexGuard<'_, Slots<T>>> {
        self.slots.lock().map_err(|_| FfiError::LockPoisoned)
    }

    fn encode(&self, index: u32, generation: u32) -> u64 {
        (self.kind.tag() << TAG_SHIFT)
            | (u64::from(generation & GENERATION_MASK) << GENERATION_SHIFT)
            | (u64::from(index) + 1)
    }

    /// Split `handle` into `(index, generation)` if it carries this table's tag.
    fn decode(&self, handle: u64) -> Option<(usize, u32)> {
        if handle >> TAG_SHIFT != self.kind.tag() {
            return None;
        }
        let slot = handle & INDEX_MASK;
        if slot == 0 {
            return None;
        }
        let generation = ((handle >> GENERATION_SHIFT) as u32) & GENERATION_MASK;
        Some(((slot - 1) as usize, generation))
    }

    fn invalid(&self, handle: u64) -> FfiError {
        FfiError::InvalidHandle {
            kind: self.kind,
            handle,
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&self, value: T) -> FfiResult<u64> {
        let mut slots = self.lock()?;
        let (index, generation) = match slots.free.pop() {
            Some(index) => {
                let slot = &mut slots.entries[index as usize];
                slot.value = Some(value);
                (index, slot.generation)
            }
            None => {
                let index = u32::try_from(slots.entries.len())
                    .map_err(|_| FfiError::InvalidHandle { kind: self.kind, handle: 0 })?;
                slots.entries.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                (index, 0)
            }
        };
        let handle = self.encode(index, generation);
        debug!(kind = %self.kind, handle, "handle allocated");
        Ok(handle)
    }

    /// Take the value out of the table, invalidating `handle`.
    pub fn remove(&self, handle: u64) -> FfiResult<T> {
        let mut slots = self.lock()?;
        let (index, generation) = self.decode(handle).ok_or_else(|| self.invalid(handle))?;
        let slot = slots
            .entries
            .get_mut(index)
            .filter(|slot| slot.generation == generation)
            .ok_or_else(|| self.invalid(handle))?;
        let value = slot.value.take().ok_or_else(|| self.invalid(handle))?;
        slot.generation = slot.generation.wrapping_add(1) & GENERATION_MASK;
        // `index` came from a u32 in `encode`, so it fits.
        slots.free.push(index as u32);
        Ok(value)
    }

    /// Free `handle`, ignoring null and stale handles.
    pub fn release(&self, handle: u64) {
        if handle == 0 {
            return;
        }
        if let Err(e) = self.remove(handle) {
            warn!(error = %e, "ignoring release of invalid handle");
        }
    }

    /// Run `f` on the live value behind `handle`.
    pub fn with<R>(&self, handle: u64, f: impl FnOnce(&T) -> R) -> FfiResult<R> {
        let slots = self.lock()?;
        let (index, generation) = self.decode(handle).ok_or_else(|| self.invalid(handle))?;
        slots
            .entries
            .get(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_ref())
            .map(f)
            .ok_or_else(|| self.invalid(handle))
    }

    /// Run `f` on the live value behind `handle`, mutably.
    pub fn with_mut<R>(&self, handle: u64, f: impl FnOnce(&mut T) -> R) -> FfiResult<R> {
        let mut slots = self.lock()?;
        let (index, generation) = self.decode(handle).ok_or_else(|| self.invalid(handle))?;
        slots
            .entries
            .get_mut(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_mut())
            .map(f)
            .ok_or_else(|| self.invalid(handle))
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.lock()
            .map(|slots| slots.entries.len() - slots.free.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> HandleTable<T> {
    /// Clone the value behind `handle`.
    pub fn get_cloned(&self, handle: u64) -> FfiResult<T> {
        self.with(handle, T::clone)
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_read_back() {
        let table = HandleTable::new(HandleKind::Skill);
        let a = table.insert("a".to_string()).unwrap();
        let b = table.insert("b".to_string()).unwrap();
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_eq!(table.get_cloned(a).unwrap(), "a");
        assert_eq!(table.get_cloned(b).unwrap(), "b");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn stale_handle_is_rejected_after_slot_reuse() {
        let table = HandleTable::new(HandleKind::Skill);
        let old = table.insert(1).unwrap();
        assert_eq!(table.remove(old).unwrap(), 1);

        let new = table.insert(2).unwrap();
        assert_ne!(old, new, "reused slot must carry a new generation");
        assert!(matches!(
            table.get_cloned(old),
            Err(FfiError::InvalidHandle { .. })
        ));
        assert_eq!(table.get_cloned(new).unwrap(), 2);
    }

    #[test]
    fn double_release_is_harmless() {
        let table = HandleTable::new(HandleKind::User);
        let h = table.insert(5).unwrap();
        let other = table.insert(6).unwrap();
        table.release(h);
        table.release(h);
        table.release(0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_cloned(other).unwrap(), 6);
    }

    #[test]
    fn handles_are_bound_to_their_table() {
        let skills = HandleTable::new(HandleKind::Skill);
        let users = HandleTable::new(HandleKind::User);
        let s = skills.insert(1).unwrap();
        let _u = users.insert(1).unwrap();
        assert!(users.get_cloned(s).is_err());
        assert!(skills.get_cloned(0).is_err());
    }

    #[test]
    fn with_mut_updates_in_place() {
        let table = HandleTable::new(HandleKind::User);
        let h = table.insert(vec![1]).unwrap();
        table.with_mut(h, |v| v.push(2)).unwrap();
        assert_eq!(table.with(h, |v| v.len()).unwrap(), 2);
    }
}
