//! User record handle lifecycle and staging (no disk writes).

use std::ffi::c_char;

use skillswap_store::{Location, SkillKind, UserRecord};
use tracing::debug;

use crate::error::{FfiResult, handle_call, status_call};
use crate::state::{SKILLS, USERS};
use crate::strings;

/// Allocate a user record with empty skill sets and a fresh identity.
///
/// `location_name` and `photo` may be null (read as empty). If either
/// coordinate is not finite the record has no location. Returns `0` on
/// invalid input. Coordinates arrive as C `float` and are widened to
/// `f64` for storage.
///
/// # Safety
///
/// Each string pointer must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn user_info_new_basic(
    name: *const c_char,
    location_name: *const c_char,
    lat: f32,
    long: f32,
    photo: *const c_char,
) -> u64 {
    handle_call("user_info_new_basic", || {
        // SAFETY: forwarded caller contract for all three strings.
        let name = unsafe { strings::required(name, "name") }?;
        let location_name = unsafe { strings::optional(location_name, "location_name") }?;
        let photo = unsafe { strings::optional(photo, "photo") }?;

        let location = Location::new(f64::from(lat), f64::from(long));
        let record = UserRecord::new(name, location_name, location, photo);
        debug!(user_id = %record.id, name = %record.name, "user record created");
        USERS.insert(record)
    })
}

/// Release a user handle. The store's copy, if registered, is unaffected.
#[unsafe(no_mangle)]
pub extern "C" fn user_info_free(user: u64) {
    USERS.release(user);
}

fn stage(user: u64, skill: u64, kind: SkillKind) -> FfiResult<()> {
    let skill = SKILLS.get_cloned(skill)?;
    USERS.with_mut(user, |record| {
        record.add(kind, skill);
    })
}

/// Attach a copy of `skill` to the record's offered set.
#[unsafe(no_mangle)]
pub extern "C" fn user_info_add_skill(user: u64, skill: u64) -> i32 {
    status_call("user_info_add_skill", || stage(user, skill, SkillKind::Offered))
}

/// Attach a copy of `skill` to the record's wanted set.
#[unsafe(no_mangle)]
pub extern "C" fn user_info_add_interest(user: u64, skill: u64) -> i32 {
    status_call("user_info_add_interest", || {
        stage(user, skill, SkillKind::Wanted)
    })
}
