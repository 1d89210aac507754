//! Store binding, registration, write-through mutation, and snapshots.

use std::ffi::{CString, c_char};

use skillswap_store::{SkillKind, UserRecord};
use tracing::debug;

use crate::error::{FfiResult, status_call, string_call};
use crate::state::{SKILLS, STORE, USERS};
use crate::strings;

/// Bind the store to the JSON file at `path` and load its content.
///
/// Calling it again rebinds: the in-memory content is replaced by the new
/// file's content.
///
/// # Safety
///
/// `path` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn set_data_path(path: *const c_char) -> i32 {
    status_call("set_data_path", || {
        // SAFETY: forwarded caller contract.
        let path = unsafe { strings::required(path, "path") }?;
        STORE.set_data_path(path)?;
        Ok(())
    })
}

/// Register a copy of the record in the store without writing to disk.
///
/// If the store already holds a user with the same name under another id
/// (for instance one loaded from the data file), no entry is added: the
/// caller's record takes over the stored identity and skill sets, so later
/// write-through calls update that user.
#[unsafe(no_mangle)]
pub extern "C" fn user_add_to_store(user: u64) -> i32 {
    status_call("user_add_to_store", || {
        let record = USERS.get_cloned(user)?;
        let stored = STORE.register_or_adopt(record)?;
        USERS.with_mut(user, |record| *record = stored)?;
        Ok(())
    })
}

#[derive(Clone, Copy)]
enum Change {
    Add,
    Remove,
}

/// Apply a set change to the registered copy of `user`, persist, and mirror
/// the resulting set back onto the caller's record.
fn write_through(user: u64, skill: u64, kind: SkillKind, change: Change) -> FfiResult<()> {
    let skill = SKILLS.get_cloned(skill)?;
    let id = USERS.with(user, |record| record.id.clone())?;

    let updated: UserRecord = match (kind, change) {
        (SkillKind::Offered, Change::Add) => STORE.add_skill_and_write(&id, skill)?,
        (SkillKind::Wanted, Change::Add) => STORE.add_interest_and_write(&id, skill)?,
        (SkillKind::Offered, Change::Remove) => STORE.remove_skill_and_write(&id, skill.name())?,
        (SkillKind::Wanted, Change::Remove) => {
            STORE.remove_interest_and_write(&id, skill.name())?
        }
    };

    let mirrored = USERS.with_mut(user, |record| {
        *record.skill_set_mut(kind) = updated.skill_set(kind).clone();
    });
    if let Err(e) = mirrored {
        // The write itself succeeded; the caller released the handle meanwhile.
        debug!(error = %e, "could not mirror update onto caller record");
    }
    Ok(())
}

/// Add a copy of `skill` to the user's offered set and persist the store.
#[unsafe(no_mangle)]
pub extern "C" fn user_add_skill_and_write(user: u64, skill: u64) -> i32 {
    status_call("user_add_skill_and_write", || {
        write_through(user, skill, SkillKind::Offered, Change::Add)
    })
}

/// Add a copy of `interest` to the user's wanted set and persist the store.
#[unsafe(no_mangle)]
pub extern "C" fn user_add_interest_and_write(user: u64, interest: u64) -> i32 {
    status_call("user_add_interest_and_write", || {
        write_through(user, interest, SkillKind::Wanted, Change::Add)
    })
}

/// Remove any offered skill named like `skill` and persist the store.
///
/// Matching is by name, so any handle with the same name works. Removing
/// an absent skill succeeds.
#[unsafe(no_mangle)]
pub extern "C" fn user_remove_skill_and_write(user: u64, skill: u64) -> i32 {
    status_call("user_remove_skill_and_write", || {
        write_through(user, skill, SkillKind::Offered, Change::Remove)
    })
}

/// Remove any wanted skill named like `interest` and persist the store.
#[unsafe(no_mangle)]
pub extern "C" fn user_remove_interest_and_write(user: u64, interest: u64) -> i32 {
    status_call("user_remove_interest_and_write", || {
        write_through(user, interest, SkillKind::Wanted, Change::Remove)
    })
}

/// Render the in-memory store (staged users included) as a JSON array.
///
/// The caller owns the returned string and must release it with
/// [`string_free`]. Returns null on failure.
#[unsafe(no_mangle)]
pub extern "C" fn read_all_users_json() -> *mut c_char {
    string_call("read_all_users_json", || Ok(STORE.to_json()?))
}

/// Release a string returned by this library.
///
/// # Safety
///
/// `ptr` must be null or a pointer previously returned by
/// [`read_all_users_json`] that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: produced by `CString::into_raw` in `string_call`.
        drop(unsafe { CString::from_raw(ptr) });
    }
}
