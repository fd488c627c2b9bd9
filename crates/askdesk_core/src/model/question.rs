//! Question domain model.
//!
//! # Responsibility
//! - Define the question read model and its creation draft.
//! - Validate drafts before they reach persistence.
//!
//! # Invariants
//! - `votes`, `solved` and `answers_count` are derived aggregates; they are
//!   never set through a draft and only move via repository write paths.
//! - `tags` are normalized to lowercase and deduplicated before persistence.

use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a question row.
pub type QuestionId = i64;

/// Validation failures for question drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionValidationError {
    EmptyTitle,
    EmptyDescription,
    EmptyCategory,
    EmptyAuthorName,
}

impl Display for QuestionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "question title cannot be empty"),
            Self::EmptyDescription => write!(f, "question description cannot be empty"),
            Self::EmptyCategory => write!(f, "question category cannot be empty"),
            Self::EmptyAuthorName => write!(f, "question author name cannot be empty"),
        }
    }
}

impl Error for QuestionValidationError {}

/// Input shape for creating a question.
///
/// Derived fields are intentionally absent; storage initializes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub title: String,
    pub description: String,
    /// Product or topic the question is filed under.
    pub category: String,
    /// Free-form labels; normalized by the repository before persistence.
    pub tags: Vec<String>,
    pub author_id: UserId,
    pub author_name: String,
}

impl QuestionDraft {
    /// Checks draft fields that storage cannot express as constraints.
    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        if self.title.trim().is_empty() {
            return Err(QuestionValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(QuestionValidationError::EmptyDescription);
        }
        if self.category.trim().is_empty() {
            return Err(QuestionValidationError::EmptyCategory);
        }
        if self.author_name.trim().is_empty() {
            return Err(QuestionValidationError::EmptyAuthorName);
        }
        Ok(())
    }
}

/// Question read model with consistent derived aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author_id: UserId,
    pub author_name: String,
    /// Signed sum of all live votes pointing at this question.
    pub votes: i64,
    /// True once any answer has been accepted.
    pub solved: bool,
    /// Count of answers filed under this question.
    pub answers_count: i64,
    /// Epoch milliseconds.
    pub created_at: i64,
}
