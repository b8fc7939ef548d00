//! Command implementations
//!
//! Thin display layers over the core: each command loads structured
//! values from the store or analyzer and formats them for the terminal.

pub mod achievements;
pub mod analyze;
pub mod ask;
pub mod git;
pub mod memory;
pub mod models;
pub mod search;
pub mod sessions;

use crate::achievements::Unlock;

/// Unlock events are returned by the core; surfacing them is this layer's
/// call.
pub(crate) fn print_unlocks(unlocks: &[Unlock]) {
    for unlock in unlocks {
        println!("🏆 Achievement unlocked: {}!", unlock.name);
    }
}
