//! Skill handle lifecycle.

use std::ffi::c_char;

use skillswap_store::Skill;

use crate::error::handle_call;
use crate::state::SKILLS;
use crate::strings;

/// Allocate a skill named `name`.
///
/// Returns `0` if `name` is null or not UTF-8 (see `last_error_message`).
///
/// # Safety
///
/// `name` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skill_new(name: *const c_char) -> u64 {
    handle_call("skill_new", || {
        // SAFETY: forwarded caller contract.
        let name = unsafe { strings::required(name, "name") }?;
        SKILLS.insert(Skill::new(name))
    })
}

/// Release a skill handle.
///
/// Null and already-released handles are ignored. Copies of the skill that
/// were attached to user records are unaffected.
#[unsafe(no_mangle)]
pub extern "C" fn skill_free(skill: u64) {
    SKILLS.release(skill);
}
