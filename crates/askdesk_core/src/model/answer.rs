//! Answer domain model.
//!
//! # Responsibility
//! - Define the answer read model and its creation draft.
//!
//! # Invariants
//! - `question_id` is immutable once the answer is created.
//! - `votes` and `is_accepted` are derived; only repository write paths
//!   move them.
//! - At most one answer per question carries `is_accepted = true`.

use crate::model::question::QuestionId;
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for an answer row.
pub type AnswerId = i64;

/// Validation failures for answer drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerValidationError {
    EmptyContent,
    EmptyAuthorName,
}

impl Display for AnswerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "answer content cannot be empty"),
            Self::EmptyAuthorName => write!(f, "answer author name cannot be empty"),
        }
    }
}

impl Error for AnswerValidationError {}

/// Input shape for posting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDraft {
    pub question_id: QuestionId,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
}

impl AnswerDraft {
    pub fn validate(&self) -> Result<(), AnswerValidationError> {
        if self.content.trim().is_empty() {
            return Err(AnswerValidationError::EmptyContent);
        }
        if self.author_name.trim().is_empty() {
            return Err(AnswerValidationError::EmptyAuthorName);
        }
        Ok(())
    }
}

/// Answer read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    /// Signed sum of all live votes pointing at this answer.
    pub votes: i64,
    /// Set by the acceptance path; cleared when a sibling is accepted.
    pub is_accepted: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
}
