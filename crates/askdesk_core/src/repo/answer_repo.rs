//! Answer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide answer persistence on top of the `answers` table.
//! - Own the acceptance write path that keeps `is_accepted` and the parent
//!   question's `solved` flag consistent.
//!
//! # Invariants
//! - Creating an answer and incrementing the parent's `answers_count`
//!   happen in one transaction.
//! - Acceptance clears every sibling's `is_accepted` in the same
//!   transaction that sets the target's, so at most one answer per
//!   question is ever accepted.
//! - `solved` only moves from the acceptance path and never reverts.

use crate::model::answer::{Answer, AnswerDraft, AnswerId};
use crate::model::question::QuestionId;
use crate::repo::question_repo::{
    ensure_question_connection_ready, ensure_table_with_columns, parse_bool_column, parse_user_id,
    RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const ANSWER_SELECT_SQL: &str = "SELECT
    id,
    question_id,
    content,
    author_id,
    author_name,
    votes,
    is_accepted,
    created_at
FROM answers";

/// Repository interface for answer operations.
pub trait AnswerRepository {
    /// Creates one answer and bumps the parent question's answer count.
    fn create_answer(&mut self, draft: &AnswerDraft) -> RepoResult<Answer>;
    /// Gets one answer by id.
    fn get_answer(&self, id: AnswerId) -> RepoResult<Option<Answer>>;
    /// Lists a question's answers, accepted first, then by votes.
    fn list_for_question(&self, question_id: QuestionId) -> RepoResult<Vec<Answer>>;
    /// Marks one answer accepted and flips the parent question to solved.
    fn accept_answer(&mut self, id: AnswerId) -> RepoResult<Answer>;
}

/// SQLite-backed answer repository.
pub struct SqliteAnswerRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAnswerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_question_connection_ready(conn)?;
        ensure_table_with_columns(
            conn,
            "answers",
            &[
                "id",
                "question_id",
                "content",
                "author_id",
                "author_name",
                "votes",
                "is_accepted",
                "created_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl AnswerRepository for SqliteAnswerRepository<'_> {
    fn create_answer(&mut self, draft: &AnswerDraft) -> RepoResult<Answer> {
        draft.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // The count bump doubles as the parent existence check.
        let changed = tx.execute(
            "UPDATE questions
             SET answers_count = answers_count + 1
             WHERE id = ?1;",
            [draft.question_id],
        )?;
        if changed == 0 {
            return Err(RepoError::QuestionNotFound(draft.question_id));
        }

        tx.execute(
            "INSERT INTO answers (
                question_id,
                content,
                author_id,
                author_name
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.question_id,
                draft.content.as_str(),
                draft.author_id.to_string(),
                draft.author_name.trim(),
            ],
        )?;

        let answer = get_answer_in_tx(&tx, tx.last_insert_rowid())?.ok_or(
            RepoError::InvalidData("created answer not readable in transaction".to_string()),
        )?;
        tx.commit()?;

        Ok(answer)
    }

    fn get_answer(&self, id: AnswerId) -> RepoResult<Option<Answer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ANSWER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_answer_row(row)?));
        }

        Ok(None)
    }

    fn list_for_question(&self, question_id: QuestionId) -> RepoResult<Vec<Answer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ANSWER_SELECT_SQL}
             WHERE question_id = ?1
             ORDER BY is_accepted DESC, votes DESC, created_at ASC, id ASC;"
        ))?;

        let mut rows = stmt.query([question_id])?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next()? {
            answers.push(parse_answer_row(row)?);
        }

        Ok(answers)
    }

    fn accept_answer(&mut self, id: AnswerId) -> RepoResult<Answer> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let question_id: QuestionId = match tx
            .query_row("SELECT question_id FROM answers WHERE id = ?1;", [id], |row| {
                row.get(0)
            }) {
            Ok(value) => value,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(RepoError::AnswerNotFound(id));
            }
            Err(err) => return Err(err.into()),
        };

        tx.execute(
            "UPDATE answers
             SET is_accepted = 0
             WHERE question_id = ?1
               AND id <> ?2;",
            params![question_id, id],
        )?;
        tx.execute("UPDATE answers SET is_accepted = 1 WHERE id = ?1;", [id])?;
        tx.execute("UPDATE questions SET solved = 1 WHERE id = ?1;", [question_id])?;

        let answer = get_answer_in_tx(&tx, id)?.ok_or(RepoError::AnswerNotFound(id))?;
        tx.commit()?;

        Ok(answer)
    }
}

fn get_answer_in_tx(tx: &Transaction<'_>, id: AnswerId) -> RepoResult<Option<Answer>> {
    let mut stmt = tx.prepare(&format!("{ANSWER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_answer_row(row)?));
    }
    Ok(None)
}

fn parse_answer_row(row: &Row<'_>) -> RepoResult<Answer> {
    Ok(Answer {
        id: row.get("id")?,
        question_id: row.get("question_id")?,
        content: row.get("content")?,
        author_id: parse_user_id(&row.get::<_, String>("author_id")?, "answers.author_id")?,
        author_name: row.get("author_name")?,
        votes: row.get("votes")?,
        is_accepted: parse_bool_column(row.get("is_accepted")?, "answers.is_accepted")?,
        created_at: row.get("created_at")?,
    })
}
