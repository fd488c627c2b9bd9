//! Core domain logic for the AskDesk community Q&A forum.
//! This crate is the single source of truth for voting and acceptance
//! invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::answer::{Answer, AnswerDraft, AnswerId, AnswerValidationError};
pub use model::question::{Question, QuestionDraft, QuestionId, QuestionValidationError};
pub use model::report::{
    Report, ReportDraft, ReportId, ReportResolution, ReportStatus, ReportSubject,
};
pub use model::vote::{
    Vote, VoteDirection, VoteId, VoteOutcome, VoteTarget, VoteTargetError,
};
pub use model::UserId;
pub use repo::answer_repo::{AnswerRepository, SqliteAnswerRepository};
pub use repo::question_repo::{
    ForumStats, QuestionListQuery, QuestionRepository, QuestionSort, QuestionStatusFilter,
    QuestionSuggestion, RepoError, RepoResult, SearchSuggestions, SqliteQuestionRepository,
};
pub use repo::report_repo::{ReportRepository, SqliteReportRepository};
pub use repo::vote_repo::{SqliteVoteRepository, VoteRepository};
pub use service::answer_service::{AnswerService, AnswerServiceError};
pub use service::question_service::{QuestionService, QuestionServiceError, QuestionsListResult};
pub use service::report_service::{ReportService, ReportServiceError};
pub use service::vote_service::{VoteCastRequest, VoteService, VoteServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
