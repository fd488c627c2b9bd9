//! Moderation report use-case service.
//!
//! # Responsibility
//! - Provide filing, listing and resolution entry points for the
//!   moderation queue.

use crate::model::report::{Report, ReportDraft, ReportId, ReportResolution};
use crate::model::UserId;
use crate::repo::question_repo::RepoError;
use crate::repo::report_repo::ReportRepository;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for report use-cases.
#[derive(Debug)]
pub enum ReportServiceError {
    /// Target report does not exist.
    ReportNotFound(ReportId),
    /// Target report already left the pending state.
    AlreadyClosed(ReportId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ReportServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReportNotFound(id) => write!(f, "report not found: {id}"),
            Self::AlreadyClosed(id) => {
                write!(f, "report {id} has already been resolved or dismissed")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReportServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReportServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ReportNotFound(id) => Self::ReportNotFound(id),
            RepoError::ReportAlreadyClosed(id) => Self::AlreadyClosed(id),
            other => Self::Repo(other),
        }
    }
}

/// Report service facade over repository implementations.
pub struct ReportService<R: ReportRepository> {
    repo: R,
}

impl<R: ReportRepository> ReportService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Files one report against an existing question or answer.
    pub fn file_report(&mut self, draft: &ReportDraft) -> Result<Report, ReportServiceError> {
        Ok(self.repo.file_report(draft)?)
    }

    /// Gets one report by stable id.
    pub fn get_report(&self, id: ReportId) -> Result<Option<Report>, ReportServiceError> {
        Ok(self.repo.get_report(id)?)
    }

    /// Lists all reports, newest first.
    pub fn list_reports(&self) -> Result<Vec<Report>, ReportServiceError> {
        Ok(self.repo.list_reports()?)
    }

    /// Moves one pending report to a terminal status.
    pub fn resolve_report(
        &mut self,
        id: ReportId,
        resolver: UserId,
        resolution: ReportResolution,
    ) -> Result<Report, ReportServiceError> {
        Ok(self.repo.resolve_report(id, resolver, resolution)?)
    }
}
