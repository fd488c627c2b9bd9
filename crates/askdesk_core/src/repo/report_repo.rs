//! Moderation report repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist reports against questions or answers.
//! - Own the resolve transition for pending reports.
//!
//! # Invariants
//! - A report can only be filed against an existing subject.
//! - `Pending` is the only state a resolution can leave from.

use crate::model::report::{
    Report, ReportDraft, ReportId, ReportResolution, ReportStatus, ReportSubject,
};
use crate::model::UserId;
use crate::repo::question_repo::{
    ensure_question_connection_ready, ensure_table_with_columns, parse_user_id, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const REPORT_SELECT_SQL: &str = "SELECT
    id,
    subject_type,
    subject_id,
    reason,
    details,
    reported_by,
    status,
    resolved_by,
    created_at,
    resolved_at
FROM reports";

/// Repository interface for moderation reports.
pub trait ReportRepository {
    /// Files one report against an existing question or answer.
    fn file_report(&mut self, draft: &ReportDraft) -> RepoResult<Report>;
    /// Gets one report by id.
    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>>;
    /// Lists all reports, newest first.
    fn list_reports(&self) -> RepoResult<Vec<Report>>;
    /// Moves one pending report to a terminal status.
    fn resolve_report(
        &mut self,
        id: ReportId,
        resolver: UserId,
        resolution: ReportResolution,
    ) -> RepoResult<Report>;
}

/// SQLite-backed report repository.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_question_connection_ready(conn)?;
        ensure_table_with_columns(
            conn,
            "reports",
            &[
                "id",
                "subject_type",
                "subject_id",
                "reason",
                "details",
                "reported_by",
                "status",
                "resolved_by",
                "created_at",
                "resolved_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn file_report(&mut self, draft: &ReportDraft) -> RepoResult<Report> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        ensure_subject_exists(&tx, draft.subject)?;

        let (subject_type, subject_id) = subject_to_db(draft.subject);
        tx.execute(
            "INSERT INTO reports (
                subject_type,
                subject_id,
                reason,
                details,
                reported_by
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                subject_type,
                subject_id,
                draft.reason.trim(),
                draft.details.as_deref(),
                draft.reported_by.to_string(),
            ],
        )?;

        let report = get_report_in_tx(&tx, tx.last_insert_rowid())?.ok_or(
            RepoError::InvalidData("filed report not readable in transaction".to_string()),
        )?;
        tx.commit()?;

        Ok(report)
    }

    fn get_report(&self, id: ReportId) -> RepoResult<Option<Report>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPORT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_report_row(row)?));
        }

        Ok(None)
    }

    fn list_reports(&self) -> RepoResult<Vec<Report>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REPORT_SELECT_SQL} ORDER BY created_at DESC, id DESC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next()? {
            reports.push(parse_report_row(row)?);
        }

        Ok(reports)
    }

    fn resolve_report(
        &mut self,
        id: ReportId,
        resolver: UserId,
        resolution: ReportResolution,
    ) -> RepoResult<Report> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status: String = match tx.query_row(
            "SELECT status FROM reports WHERE id = ?1;",
            [id],
            |row| row.get(0),
        ) {
            Ok(value) => value,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(RepoError::ReportNotFound(id));
            }
            Err(err) => return Err(err.into()),
        };
        if status != "pending" {
            return Err(RepoError::ReportAlreadyClosed(id));
        }

        tx.execute(
            "UPDATE reports
             SET
                status = ?1,
                resolved_by = ?2,
                resolved_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![
                status_to_db(resolution.status()),
                resolver.to_string(),
                id,
            ],
        )?;

        let report = get_report_in_tx(&tx, id)?.ok_or(RepoError::ReportNotFound(id))?;
        tx.commit()?;

        Ok(report)
    }
}

fn ensure_subject_exists(tx: &Transaction<'_>, subject: ReportSubject) -> RepoResult<()> {
    let (sql, id, missing) = match subject {
        ReportSubject::Question(id) => (
            "SELECT EXISTS(SELECT 1 FROM questions WHERE id = ?1);",
            id,
            RepoError::QuestionNotFound(id),
        ),
        ReportSubject::Answer(id) => (
            "SELECT EXISTS(SELECT 1 FROM answers WHERE id = ?1);",
            id,
            RepoError::AnswerNotFound(id),
        ),
    };

    let exists: i64 = tx.query_row(sql, [id], |row| row.get(0))?;
    if exists != 1 {
        return Err(missing);
    }
    Ok(())
}

fn get_report_in_tx(tx: &Transaction<'_>, id: ReportId) -> RepoResult<Option<Report>> {
    let mut stmt = tx.prepare(&format!("{REPORT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_report_row(row)?));
    }
    Ok(None)
}

fn parse_report_row(row: &Row<'_>) -> RepoResult<Report> {
    let subject_type: String = row.get("subject_type")?;
    let subject_id: i64 = row.get("subject_id")?;
    let subject = match subject_type.as_str() {
        "question" => ReportSubject::Question(subject_id),
        "answer" => ReportSubject::Answer(subject_id),
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid report subject type `{other}` in reports.subject_type"
            )));
        }
    };

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text)?;

    let resolved_by = match row.get::<_, Option<String>>("resolved_by")? {
        Some(value) => Some(parse_user_id(&value, "reports.resolved_by")?),
        None => None,
    };

    Ok(Report {
        id: row.get("id")?,
        subject,
        reason: row.get("reason")?,
        details: row.get("details")?,
        reported_by: parse_user_id(&row.get::<_, String>("reported_by")?, "reports.reported_by")?,
        status,
        resolved_by,
        created_at: row.get("created_at")?,
        resolved_at: row.get("resolved_at")?,
    })
}

fn subject_to_db(subject: ReportSubject) -> (&'static str, i64) {
    match subject {
        ReportSubject::Question(id) => ("question", id),
        ReportSubject::Answer(id) => ("answer", id),
    }
}

fn status_to_db(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pending => "pending",
        ReportStatus::Resolved => "resolved",
        ReportStatus::Dismissed => "dismissed",
    }
}

fn parse_status(value: &str) -> RepoResult<ReportStatus> {
    match value {
        "pending" => Ok(ReportStatus::Pending),
        "resolved" => Ok(ReportStatus::Resolved),
        "dismissed" => Ok(ReportStatus::Dismissed),
        other => Err(RepoError::InvalidData(format!(
            "invalid report status `{other}` in reports.status"
        ))),
    }
}
