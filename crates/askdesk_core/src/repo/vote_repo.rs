//! Vote ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record one vote per (voter, target) pair and classify each cast as
//!   create, toggle-off or flip.
//! - Project the resulting signed delta onto the target's `votes`
//!   aggregate inside the same transaction.
//!
//! # Invariants
//! - Ledger mutation and aggregate delta commit together or not at all.
//! - Aggregate updates are relative (`votes = votes + delta`), never
//!   absolute writes from a prior read.
//! - A question vote matches only rows with `answer_id IS NULL`, and vice
//!   versa; the lookup uses null-safe equality on both columns.

use crate::model::vote::{Vote, VoteDirection, VoteId, VoteOutcome, VoteTarget};
use crate::model::UserId;
use crate::repo::question_repo::{
    ensure_question_connection_ready, ensure_table_with_columns, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for the vote ledger.
pub trait VoteRepository {
    /// Applies one cast to the ledger and the target's vote aggregate.
    ///
    /// Transition policy:
    /// - no prior vote: insert, outcome `Created`;
    /// - prior vote in the same direction: delete, outcome `Removed`;
    /// - prior vote in the opposite direction: update in place, outcome
    ///   `Flipped`.
    fn cast_vote(
        &mut self,
        voter_id: UserId,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> RepoResult<VoteOutcome>;

    /// Returns the voter's current vote on the target, if any.
    fn get_vote(&self, voter_id: UserId, target: VoteTarget) -> RepoResult<Option<Vote>>;
}

/// SQLite-backed vote ledger.
pub struct SqliteVoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteVoteRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_question_connection_ready(conn)?;
        ensure_table_with_columns(
            conn,
            "votes",
            &["id", "voter_id", "question_id", "answer_id", "direction"],
        )?;
        Ok(Self { conn })
    }
}

impl VoteRepository for SqliteVoteRepository<'_> {
    fn cast_vote(
        &mut self,
        voter_id: UserId,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> RepoResult<VoteOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        ensure_target_exists(&tx, target)?;

        let outcome = match find_vote(&tx, voter_id, target)? {
            None => {
                tx.execute(
                    "INSERT INTO votes (voter_id, question_id, answer_id, direction)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        voter_id.to_string(),
                        target.question_id(),
                        target.answer_id(),
                        direction_to_db(direction),
                    ],
                )?;
                VoteOutcome::Created {
                    vote: Vote {
                        id: tx.last_insert_rowid(),
                        voter_id,
                        target,
                        direction,
                    },
                }
            }
            Some((vote_id, held)) if held == direction => {
                tx.execute("DELETE FROM votes WHERE id = ?1;", [vote_id])?;
                VoteOutcome::Removed { direction: held }
            }
            Some((vote_id, held)) => {
                tx.execute(
                    "UPDATE votes SET direction = ?1 WHERE id = ?2;",
                    params![direction_to_db(direction), vote_id],
                )?;
                VoteOutcome::Flipped {
                    from: held,
                    vote: Vote {
                        id: vote_id,
                        voter_id,
                        target,
                        direction,
                    },
                }
            }
        };

        apply_aggregate_delta(&tx, target, outcome.aggregate_delta())?;
        tx.commit()?;

        Ok(outcome)
    }

    fn get_vote(&self, voter_id: UserId, target: VoteTarget) -> RepoResult<Option<Vote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, direction
             FROM votes
             WHERE voter_id = ?1
               AND question_id IS ?2
               AND answer_id IS ?3;",
        )?;

        let mut rows = stmt.query(params![
            voter_id.to_string(),
            target.question_id(),
            target.answer_id(),
        ])?;
        if let Some(row) = rows.next()? {
            let direction = parse_direction(&row.get::<_, String>("direction")?)?;
            return Ok(Some(Vote {
                id: row.get("id")?,
                voter_id,
                target,
                direction,
            }));
        }

        Ok(None)
    }
}

fn find_vote(
    tx: &Transaction<'_>,
    voter_id: UserId,
    target: VoteTarget,
) -> RepoResult<Option<(VoteId, VoteDirection)>> {
    let mut stmt = tx.prepare(
        "SELECT id, direction
         FROM votes
         WHERE voter_id = ?1
           AND question_id IS ?2
           AND answer_id IS ?3;",
    )?;

    let mut rows = stmt.query(params![
        voter_id.to_string(),
        target.question_id(),
        target.answer_id(),
    ])?;
    if let Some(row) = rows.next()? {
        let direction = parse_direction(&row.get::<_, String>("direction")?)?;
        return Ok(Some((row.get("id")?, direction)));
    }

    Ok(None)
}

fn ensure_target_exists(tx: &Transaction<'_>, target: VoteTarget) -> RepoResult<()> {
    let (sql, id) = match target {
        VoteTarget::Question(id) => ("SELECT EXISTS(SELECT 1 FROM questions WHERE id = ?1);", id),
        VoteTarget::Answer(id) => ("SELECT EXISTS(SELECT 1 FROM answers WHERE id = ?1);", id),
    };

    let exists: i64 = tx.query_row(sql, [id], |row| row.get(0))?;
    if exists != 1 {
        return Err(RepoError::target_not_found(target));
    }
    Ok(())
}

/// Applies one signed delta to the target's `votes` aggregate.
///
/// The only write path for `questions.votes` and `answers.votes`.
fn apply_aggregate_delta(tx: &Transaction<'_>, target: VoteTarget, delta: i64) -> RepoResult<()> {
    let changed = match target {
        VoteTarget::Question(id) => tx.execute(
            "UPDATE questions SET votes = votes + ?1 WHERE id = ?2;",
            params![delta, id],
        )?,
        VoteTarget::Answer(id) => tx.execute(
            "UPDATE answers SET votes = votes + ?1 WHERE id = ?2;",
            params![delta, id],
        )?,
    };

    if changed == 0 {
        return Err(RepoError::target_not_found(target));
    }
    Ok(())
}

fn direction_to_db(direction: VoteDirection) -> &'static str {
    match direction {
        VoteDirection::Up => "up",
        VoteDirection::Down => "down",
    }
}

fn parse_direction(value: &str) -> RepoResult<VoteDirection> {
    match value {
        "up" => Ok(VoteDirection::Up),
        "down" => Ok(VoteDirection::Down),
        other => Err(RepoError::InvalidData(format!(
            "invalid vote direction `{other}` in votes.direction"
        ))),
    }
}
