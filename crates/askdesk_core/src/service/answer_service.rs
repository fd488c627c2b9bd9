//! Answer use-case service.
//!
//! # Responsibility
//! - Provide answer posting, listing and acceptance entry points.
//! - Delegate persistence and acceptance invariants to the repository.
//!
//! # Invariants
//! - Acceptance is idempotent and monotonic: there is no unaccept path,
//!   and re-accepting a sibling moves the single accepted flag.

use crate::model::answer::{Answer, AnswerDraft, AnswerId};
use crate::model::question::QuestionId;
use crate::repo::answer_repo::AnswerRepository;
use crate::repo::question_repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for answer use-cases.
#[derive(Debug)]
pub enum AnswerServiceError {
    /// Parent question does not exist.
    QuestionNotFound(QuestionId),
    /// Target answer does not exist.
    AnswerNotFound(AnswerId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AnswerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::AnswerNotFound(id) => write!(f, "answer not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AnswerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AnswerServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::QuestionNotFound(id) => Self::QuestionNotFound(id),
            RepoError::AnswerNotFound(id) => Self::AnswerNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Answer service facade over repository implementations.
pub struct AnswerService<R: AnswerRepository> {
    repo: R,
}

impl<R: AnswerRepository> AnswerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Posts one answer under an existing question.
    ///
    /// The parent question's `answers_count` moves in the same unit of
    /// work that inserts the answer row.
    pub fn post_answer(&mut self, draft: &AnswerDraft) -> Result<Answer, AnswerServiceError> {
        Ok(self.repo.create_answer(draft)?)
    }

    /// Gets one answer by stable id.
    pub fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, AnswerServiceError> {
        Ok(self.repo.get_answer(id)?)
    }

    /// Lists a question's answers, accepted first, then by votes.
    pub fn list_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, AnswerServiceError> {
        Ok(self.repo.list_for_question(question_id)?)
    }

    /// Marks one answer as the accepted solution.
    ///
    /// # Contract
    /// - Every sibling answer loses `is_accepted` in the same unit of work.
    /// - The parent question becomes (and stays) `solved`.
    /// - Accepting an already-accepted answer is a no-op with the same
    ///   observable end state.
    pub fn accept_answer(&mut self, id: AnswerId) -> Result<Answer, AnswerServiceError> {
        let answer = self.repo.accept_answer(id)?;
        info!(
            "event=answer_accept module=service status=ok answer_id={} question_id={}",
            answer.id, answer.question_id
        );
        Ok(answer)
    }
}
