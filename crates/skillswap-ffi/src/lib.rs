//! # skillswap-ffi
//!
//! C ABI for the SkillSwap store, loadable as a shared library from any
//! language with C FFI support (Node.js via ffi-napi, Python ctypes, ...).
//!
//! ## Design
//!
//! - **Opaque handles**: skills and user records are `u64` handles into
//!   generation-checked tables; `0` is null. Stale handles are detected.
//! - **Values, not references**: attaching a skill to a record copies it.
//!   Registering a record copies it into the store.
//! - **Status codes**: mutating calls return `i32` (`0` = success, see
//!   [`error`] for the non-zero codes).
//! - **Thread-local errors**: `last_error_message()` returns the message of
//!   the most recent failing call on the calling thread.
//!
//! ## Example (C)
//!
//! ```c
//! if (set_data_path("store.json") != 0) {
//!     fprintf(stderr, "%s\n", last_error_message());
//!     return 1;
//! }
//! uint64_t alex = user_info_new_basic("Alex", "Brisbane", -27.47, 153.02, "");
//! uint64_t guitar = skill_new("Guitar");
//! user_add_to_store(alex);
//! user_add_skill_and_write(alex, guitar);
//! skill_free(guitar);
//! user_info_free(alex);
//! ```

pub mod error;
pub mod handle;
pub mod logging;
pub mod skill;
pub mod store;
pub mod user;

mod state;
mod strings;

pub use error::*;
pub use logging::*;
pub use skill::*;
pub use store::*;
pub use user::*;
