//! Vote ledger domain model.
//!
//! # Responsibility
//! - Define the vote record, its target union and cast outcomes.
//! - Keep invalid target shapes (both or neither id) unrepresentable.
//!
//! # Invariants
//! - A vote points at exactly one question or exactly one answer.
//! - At most one vote exists per (voter, target) pair.
//! - Casting the held direction again removes the vote (toggle-off);
//!   casting the opposite direction flips the row in place.

use crate::model::answer::AnswerId;
use crate::model::question::QuestionId;
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a vote row.
pub type VoteId = i64;

/// Direction of a cast vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Contribution of one live vote to its target's `votes` aggregate.
    pub fn signum(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Opposite direction, used to describe flips.
    pub fn inverted(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl Display for VoteDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Invalid target shapes reportable before any write happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTargetError {
    /// Neither a question id nor an answer id was provided.
    Missing,
    /// Both ids were provided; a vote applies to exactly one target.
    Ambiguous,
}

impl Display for VoteTargetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "vote target requires a question id or an answer id"),
            Self::Ambiguous => write!(f, "vote target cannot name both a question and an answer"),
        }
    }
}

impl Error for VoteTargetError {}

/// The question or answer a vote applies to.
///
/// Modeled as a tagged union so the both-set/none-set states of the
/// underlying nullable columns cannot occur in core logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    Question(QuestionId),
    Answer(AnswerId),
}

impl VoteTarget {
    /// Builds a target from the optional-id wire shape.
    pub fn from_refs(
        question_id: Option<QuestionId>,
        answer_id: Option<AnswerId>,
    ) -> Result<Self, VoteTargetError> {
        match (question_id, answer_id) {
            (Some(id), None) => Ok(Self::Question(id)),
            (None, Some(id)) => Ok(Self::Answer(id)),
            (None, None) => Err(VoteTargetError::Missing),
            (Some(_), Some(_)) => Err(VoteTargetError::Ambiguous),
        }
    }

    /// Question id column value for persistence.
    pub fn question_id(self) -> Option<QuestionId> {
        match self {
            Self::Question(id) => Some(id),
            Self::Answer(_) => None,
        }
    }

    /// Answer id column value for persistence.
    pub fn answer_id(self) -> Option<AnswerId> {
        match self {
            Self::Question(_) => None,
            Self::Answer(id) => Some(id),
        }
    }
}

impl Display for VoteTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Question(id) => write!(f, "question {id}"),
            Self::Answer(id) => write!(f, "answer {id}"),
        }
    }
}

/// One ledger row: who voted on what, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: UserId,
    #[serde(flatten)]
    pub target: VoteTarget,
    pub direction: VoteDirection,
}

/// Result of one cast operation against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum VoteOutcome {
    /// No prior vote existed; a new row was inserted.
    Created { vote: Vote },
    /// The voter already held this direction; the row was deleted.
    Removed { direction: VoteDirection },
    /// The voter held the opposite direction; the row was updated in place.
    Flipped { from: VoteDirection, vote: Vote },
}

impl VoteOutcome {
    /// Signed delta this outcome applies to the target's `votes` aggregate.
    ///
    /// Created(up) +1, Created(down) -1, Removed(up) -1, Removed(down) +1,
    /// Flipped(down->up) +2, Flipped(up->down) -2.
    pub fn aggregate_delta(&self) -> i64 {
        match self {
            Self::Created { vote } => vote.direction.signum(),
            Self::Removed { direction } => -direction.signum(),
            Self::Flipped { vote, .. } => 2 * vote.direction.signum(),
        }
    }
}
