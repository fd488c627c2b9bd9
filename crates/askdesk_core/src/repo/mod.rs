//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//! - Own every write path that moves derived aggregates (`votes`,
//!   `solved`, `answers_count`, `is_accepted`).
//!
//! # Invariants
//! - Repository writes validate drafts before persistence.
//! - Multi-step mutations run inside one immediate transaction.
//! - Repository APIs return semantic errors (`QuestionNotFound`,
//!   `AnswerNotFound`) in addition to DB transport errors.

pub mod answer_repo;
pub mod question_repo;
pub mod report_repo;
pub mod vote_repo;
