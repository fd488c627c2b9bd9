//! Domain model for the Q&A forum core.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep derived aggregate fields (`votes`, `solved`, `answers_count`,
//!   `is_accepted`) visible but owned by repository write paths.
//!
//! # Invariants
//! - Row identity is a stable `i64` id assigned by storage.
//! - A vote points at exactly one target, encoded by `VoteTarget`.

use uuid::Uuid;

pub mod answer;
pub mod question;
pub mod report;
pub mod vote;

/// Stable identity for a forum participant.
///
/// Authentication itself lives outside core; callers hand in an already
/// authenticated user id.
pub type UserId = Uuid;
