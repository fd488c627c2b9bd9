//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod answer_service;
pub mod question_service;
pub mod report_service;
pub mod vote_service;
