//! Question use-case service.
//!
//! # Responsibility
//! - Provide question create/get/list APIs plus platform stats and
//!   typeahead suggestions.
//! - Normalize pagination input before it reaches the repository.
//!
//! # Invariants
//! - Created questions are returned through a read-back so callers always
//!   observe storage-assigned fields (id, timestamps, defaults).

use crate::model::question::{Question, QuestionDraft, QuestionId};
use crate::repo::question_repo::{
    normalize_question_limit, ForumStats, QuestionListQuery, QuestionRepository, RepoError,
    RepoResult, SearchSuggestions,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for question use-cases.
#[derive(Debug)]
pub enum QuestionServiceError {
    /// Target question does not exist.
    QuestionNotFound(QuestionId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for QuestionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent question state: {details}")
            }
        }
    }
}

impl Error for QuestionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for QuestionServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::QuestionNotFound(id) => Self::QuestionNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionsListResult {
    pub items: Vec<Question>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Question service facade over repository implementations.
pub struct QuestionService<R: QuestionRepository> {
    repo: R,
}

impl<R: QuestionRepository> QuestionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one question and returns the persisted row.
    pub fn create_question(
        &self,
        draft: &QuestionDraft,
    ) -> Result<Question, QuestionServiceError> {
        let id = self.repo.create_question(draft)?;
        self.repo
            .get_question(id)?
            .ok_or(QuestionServiceError::InconsistentState(
                "created question not found in read-back",
            ))
    }

    /// Gets one question by stable id.
    pub fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        self.repo.get_question(id)
    }

    /// Lists questions using filter, sort and pagination options.
    pub fn list_questions(
        &self,
        query: &QuestionListQuery,
    ) -> Result<QuestionsListResult, QuestionServiceError> {
        let applied_limit = normalize_question_limit(query.limit);
        let items = self.repo.list_questions(query)?;
        Ok(QuestionsListResult {
            items,
            applied_limit,
        })
    }

    /// Returns platform aggregate counters.
    pub fn stats(&self) -> RepoResult<ForumStats> {
        self.repo.stats()
    }

    /// Returns typeahead suggestions for a search prefix.
    pub fn search_suggestions(&self, term: &str) -> RepoResult<SearchSuggestions> {
        self.repo.search_suggestions(term)
    }
}
