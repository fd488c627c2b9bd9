//! Moderation report domain model.
//!
//! # Responsibility
//! - Define the report record used by the moderation queue.
//!
//! # Invariants
//! - A report subject names exactly one question or answer.
//! - Status moves `Pending -> Resolved` or `Pending -> Dismissed`, once.

use crate::model::answer::AnswerId;
use crate::model::question::QuestionId;
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a report row.
pub type ReportId = i64;

/// The content item a report complains about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSubject {
    Question(QuestionId),
    Answer(AnswerId),
}

impl Display for ReportSubject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Question(id) => write!(f, "question {id}"),
            Self::Answer(id) => write!(f, "answer {id}"),
        }
    }
}

/// Moderation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

/// Terminal decision for a pending report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportResolution {
    Resolved,
    Dismissed,
}

impl ReportResolution {
    pub fn status(self) -> ReportStatus {
        match self {
            Self::Resolved => ReportStatus::Resolved,
            Self::Dismissed => ReportStatus::Dismissed,
        }
    }
}

/// Validation failures for report drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportValidationError {
    EmptyReason,
}

impl Display for ReportValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyReason => write!(f, "report reason cannot be empty"),
        }
    }
}

impl Error for ReportValidationError {}

/// Input shape for filing a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub subject: ReportSubject,
    pub reason: String,
    pub details: Option<String>,
    pub reported_by: UserId,
}

impl ReportDraft {
    pub fn validate(&self) -> Result<(), ReportValidationError> {
        if self.reason.trim().is_empty() {
            return Err(ReportValidationError::EmptyReason);
        }
        Ok(())
    }
}

/// Report read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub subject: ReportSubject,
    pub reason: String,
    pub details: Option<String>,
    pub reported_by: UserId,
    pub status: ReportStatus,
    pub resolved_by: Option<UserId>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; set when the report leaves `Pending`.
    pub resolved_at: Option<i64>,
}
