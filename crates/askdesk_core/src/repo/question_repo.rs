//! Question repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide question persistence and the thin read surface (list,
//!   filters, stats, suggestions) over already-consistent aggregates.
//! - Own the shared repository error type and connection readiness guards.
//!
//! # Invariants
//! - Write paths call `QuestionDraft::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `votes`, `solved` and `answers_count` are never written here; they
//!   belong to the vote and answer repositories.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::answer::{AnswerId, AnswerValidationError};
use crate::model::question::{Question, QuestionDraft, QuestionId, QuestionValidationError};
use crate::model::report::{ReportId, ReportValidationError};
use crate::model::vote::VoteTarget;
use crate::model::UserId;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const QUESTION_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    tags,
    author_id,
    author_name,
    votes,
    solved,
    answers_count,
    created_at
FROM questions";

const QUESTIONS_DEFAULT_LIMIT: u32 = 20;
const QUESTIONS_LIMIT_MAX: u32 = 100;
const SUGGESTIONS_LIMIT: u32 = 5;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared error type for forum persistence operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidQuestion(QuestionValidationError),
    InvalidAnswer(AnswerValidationError),
    InvalidReport(ReportValidationError),
    Db(DbError),
    QuestionNotFound(QuestionId),
    AnswerNotFound(AnswerId),
    ReportNotFound(ReportId),
    /// Resolution was requested for a report that already left `Pending`.
    ReportAlreadyClosed(ReportId),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Maps a missing vote target to the matching not-found variant.
    pub(crate) fn target_not_found(target: VoteTarget) -> Self {
        match target {
            VoteTarget::Question(id) => Self::QuestionNotFound(id),
            VoteTarget::Answer(id) => Self::AnswerNotFound(id),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuestion(err) => write!(f, "{err}"),
            Self::InvalidAnswer(err) => write!(f, "{err}"),
            Self::InvalidReport(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::AnswerNotFound(id) => write!(f, "answer not found: {id}"),
            Self::ReportNotFound(id) => write!(f, "report not found: {id}"),
            Self::ReportAlreadyClosed(id) => {
                write!(f, "report {id} has already been resolved or dismissed")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted forum data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "repository requires column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuestion(err) => Some(err),
            Self::InvalidAnswer(err) => Some(err),
            Self::InvalidReport(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuestionValidationError> for RepoError {
    fn from(value: QuestionValidationError) -> Self {
        Self::InvalidQuestion(value)
    }
}

impl From<AnswerValidationError> for RepoError {
    fn from(value: AnswerValidationError) -> Self {
        Self::InvalidAnswer(value)
    }
}

impl From<ReportValidationError> for RepoError {
    fn from(value: ReportValidationError) -> Self {
        Self::InvalidReport(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Status facet for question listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatusFilter {
    Solved,
    Unsolved,
    /// Questions with no answers yet.
    Unanswered,
}

/// Sort order for question listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Highest vote aggregate first.
    Votes,
    /// Most answered first.
    Answers,
    /// Unsolved questions surfaced before solved ones.
    UnsolvedFirst,
}

/// Query options for listing questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionListQuery {
    /// Free-text match over title and description.
    pub search: Option<String>,
    /// Exact category filter.
    pub category: Option<String>,
    pub status: Option<QuestionStatusFilter>,
    pub sort: QuestionSort,
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Platform-level aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForumStats {
    pub total_questions: i64,
    pub solved_questions: i64,
    /// Distinct authors across questions and answers.
    pub contributors: i64,
}

/// One question row shaped for typeahead suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSuggestion {
    pub id: QuestionId,
    pub title: String,
    pub category: String,
}

/// Typeahead payload: matching questions plus matching known categories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSuggestions {
    pub questions: Vec<QuestionSuggestion>,
    pub categories: Vec<String>,
}

/// Repository interface for question operations.
pub trait QuestionRepository {
    /// Creates one question and returns its storage-assigned id.
    fn create_question(&self, draft: &QuestionDraft) -> RepoResult<QuestionId>;
    /// Gets one question by id.
    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>>;
    /// Lists questions using filter, sort and pagination options.
    fn list_questions(&self, query: &QuestionListQuery) -> RepoResult<Vec<Question>>;
    /// Returns platform aggregate counters.
    fn stats(&self) -> RepoResult<ForumStats>;
    /// Returns typeahead suggestions for a search prefix.
    fn search_suggestions(&self, term: &str) -> RepoResult<SearchSuggestions>;
}

/// SQLite-backed question repository.
pub struct SqliteQuestionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_question_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl QuestionRepository for SqliteQuestionRepository<'_> {
    fn create_question(&self, draft: &QuestionDraft) -> RepoResult<QuestionId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO questions (
                title,
                description,
                category,
                tags,
                author_id,
                author_name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                draft.title.trim(),
                draft.description.as_str(),
                draft.category.trim(),
                normalize_tags(&draft.tags).join(","),
                draft.author_id.to_string(),
                draft.author_name.trim(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUESTION_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_question_row(row)?));
        }

        Ok(None)
    }

    fn list_questions(&self, query: &QuestionListQuery) -> RepoResult<Vec<Question>> {
        let mut sql = format!("{QUESTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(term) = query.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                sql.push_str(" AND (title LIKE ? OR description LIKE ?)");
                let pattern = format!("%{term}%");
                bind_values.push(Value::Text(pattern.clone()));
                bind_values.push(Value::Text(pattern));
            }
        }

        if let Some(category) = query.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                sql.push_str(" AND category = ?");
                bind_values.push(Value::Text(category.to_string()));
            }
        }

        match query.status {
            Some(QuestionStatusFilter::Solved) => sql.push_str(" AND solved = 1"),
            Some(QuestionStatusFilter::Unsolved) => sql.push_str(" AND solved = 0"),
            Some(QuestionStatusFilter::Unanswered) => sql.push_str(" AND answers_count = 0"),
            None => {}
        }

        sql.push_str(match query.sort {
            QuestionSort::Newest => " ORDER BY created_at DESC, id DESC",
            QuestionSort::Votes => " ORDER BY votes DESC, created_at DESC, id DESC",
            QuestionSort::Answers => " ORDER BY answers_count DESC, created_at DESC, id DESC",
            QuestionSort::UnsolvedFirst => " ORDER BY solved ASC, created_at DESC, id DESC",
        });

        let limit = normalize_question_limit(query.limit);
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut questions = Vec::new();

        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }

        Ok(questions)
    }

    fn stats(&self) -> RepoResult<ForumStats> {
        let total_questions: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM questions;", [], |row| row.get(0))?;
        let solved_questions: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE solved = 1;",
            [],
            |row| row.get(0),
        )?;
        let contributors: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM (
                SELECT author_id FROM questions
                UNION
                SELECT author_id FROM answers
            );",
            [],
            |row| row.get(0),
        )?;

        Ok(ForumStats {
            total_questions,
            solved_questions,
            contributors,
        })
    }

    fn search_suggestions(&self, term: &str) -> RepoResult<SearchSuggestions> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(SearchSuggestions::default());
        }
        let pattern = format!("%{term}%");

        let mut stmt = self.conn.prepare(
            "SELECT id, title, category
             FROM questions
             WHERE title LIKE ?1
             ORDER BY votes DESC, created_at DESC, id DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![pattern.as_str(), SUGGESTIONS_LIMIT])?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next()? {
            questions.push(QuestionSuggestion {
                id: row.get("id")?,
                title: row.get("title")?,
                category: row.get("category")?,
            });
        }

        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category
             FROM questions
             WHERE category LIKE ?1
             ORDER BY category ASC;",
        )?;
        let mut rows = stmt.query([pattern.as_str()])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(row.get::<_, String>(0)?);
        }

        Ok(SearchSuggestions {
            questions,
            categories,
        })
    }
}

/// Normalizes list limit according to the questions contract.
pub fn normalize_question_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => QUESTIONS_DEFAULT_LIMIT,
        Some(value) if value > QUESTIONS_LIMIT_MAX => QUESTIONS_LIMIT_MAX,
        Some(value) => value,
        None => QUESTIONS_DEFAULT_LIMIT,
    }
}

/// Normalizes one tag value: trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(tag.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    let tags_text: String = row.get("tags")?;
    let tags = tags_text
        .split(',')
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Question {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        tags,
        author_id: parse_user_id(&row.get::<_, String>("author_id")?, "questions.author_id")?,
        author_name: row.get("author_name")?,
        votes: row.get("votes")?,
        solved: parse_bool_column(row.get("solved")?, "questions.solved")?,
        answers_count: row.get("answers_count")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn parse_user_id(value: &str, column: &str) -> RepoResult<UserId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid user id `{value}` in {column}")))
}

pub(crate) fn parse_bool_column(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn ensure_question_connection_ready(conn: &Connection) -> RepoResult<()> {
    ensure_migrated(conn)?;
    ensure_table_with_columns(
        conn,
        "questions",
        &[
            "id",
            "title",
            "description",
            "category",
            "tags",
            "author_id",
            "author_name",
            "votes",
            "solved",
            "answers_count",
            "created_at",
        ],
    )
}

pub(crate) fn ensure_migrated(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn ensure_table_with_columns(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
