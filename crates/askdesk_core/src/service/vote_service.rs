//! Vote use-case service.
//!
//! # Responsibility
//! - Validate the optional-id wire shape into a tagged vote target before
//!   any write happens.
//! - Delegate ledger and aggregate mutation to the vote repository.
//!
//! # Invariants
//! - A request naming both or neither of question/answer id is rejected
//!   without touching storage.

use crate::model::answer::AnswerId;
use crate::model::question::QuestionId;
use crate::model::vote::{Vote, VoteDirection, VoteOutcome, VoteTarget, VoteTargetError};
use crate::model::UserId;
use crate::repo::question_repo::{RepoError, RepoResult};
use crate::repo::vote_repo::VoteRepository;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Wire-shaped cast request: exactly one of `question_id` / `answer_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCastRequest {
    pub voter_id: UserId,
    pub question_id: Option<QuestionId>,
    pub answer_id: Option<AnswerId>,
    pub direction: VoteDirection,
}

/// Service error for vote use-cases.
#[derive(Debug)]
pub enum VoteServiceError {
    /// Malformed target shape; nothing was written.
    InvalidTarget(VoteTargetError),
    /// Vote target does not exist.
    QuestionNotFound(QuestionId),
    /// Vote target does not exist.
    AnswerNotFound(AnswerId),
    /// Persistence-layer failure; the whole cast was rolled back.
    Repo(RepoError),
}

impl Display for VoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTarget(err) => write!(f, "{err}"),
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::AnswerNotFound(id) => write!(f, "answer not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTarget(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VoteTargetError> for VoteServiceError {
    fn from(value: VoteTargetError) -> Self {
        Self::InvalidTarget(value)
    }
}

impl From<RepoError> for VoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::QuestionNotFound(id) => Self::QuestionNotFound(id),
            RepoError::AnswerNotFound(id) => Self::AnswerNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Vote service facade over repository implementations.
pub struct VoteService<R: VoteRepository> {
    repo: R,
}

impl<R: VoteRepository> VoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Casts one vote from its wire shape.
    ///
    /// # Contract
    /// - Exactly one of `question_id` / `answer_id` must be present.
    /// - Repeating the held direction removes the vote; the opposite
    ///   direction flips it in place.
    pub fn cast_vote(&mut self, request: &VoteCastRequest) -> Result<VoteOutcome, VoteServiceError> {
        let target = VoteTarget::from_refs(request.question_id, request.answer_id)?;
        let outcome = self.repo.cast_vote(request.voter_id, target, request.direction)?;

        info!(
            "event=vote_cast module=service status=ok target=\"{target}\" outcome={} delta={}",
            outcome_label(&outcome),
            outcome.aggregate_delta()
        );
        Ok(outcome)
    }

    /// Returns the voter's current vote on the target, if any.
    pub fn current_vote(&self, voter_id: UserId, target: VoteTarget) -> RepoResult<Option<Vote>> {
        self.repo.get_vote(voter_id, target)
    }
}

fn outcome_label(outcome: &VoteOutcome) -> &'static str {
    match outcome {
        VoteOutcome::Created { .. } => "created",
        VoteOutcome::Removed { .. } => "removed",
        VoteOutcome::Flipped { .. } => "flipped",
    }
}
