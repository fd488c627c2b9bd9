use askdesk_core::db::open_db_in_memory;
use askdesk_core::{
    AnswerDraft, AnswerRepository, QuestionDraft, QuestionRepository, RepoError,
    SqliteAnswerRepository, SqliteQuestionRepository, SqliteVoteRepository, UserId,
    VoteCastRequest, VoteDirection, VoteOutcome, VoteRepository, VoteService, VoteServiceError,
    VoteTarget, VoteTargetError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_question(conn: &mut Connection) -> i64 {
    let repo = SqliteQuestionRepository::try_new(conn).unwrap();
    repo.create_question(&QuestionDraft {
        title: "Feeder jams on thick paper".to_string(),
        description: "Every third page double-feeds.".to_string(),
        category: "scanners".to_string(),
        tags: vec![],
        author_id: Uuid::new_v4(),
        author_name: "Dana".to_string(),
    })
    .unwrap()
}

fn seed_answer(conn: &mut Connection, question_id: i64) -> i64 {
    let mut repo = SqliteAnswerRepository::try_new(conn).unwrap();
    repo.create_answer(&AnswerDraft {
        question_id,
        content: "Clean the separation rollers.".to_string(),
        author_id: Uuid::new_v4(),
        author_name: "Riley".to_string(),
    })
    .unwrap()
    .id
}

fn question_votes(conn: &Connection, id: i64) -> i64 {
    conn.query_row("SELECT votes FROM questions WHERE id = ?1;", [id], |row| {
        row.get(0)
    })
    .unwrap()
}

fn answer_votes(conn: &Connection, id: i64) -> i64 {
    conn.query_row("SELECT votes FROM answers WHERE id = ?1;", [id], |row| {
        row.get(0)
    })
    .unwrap()
}

fn vote_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM votes;", [], |row| row.get(0))
        .unwrap()
}

fn cast(
    conn: &mut Connection,
    voter: UserId,
    target: VoteTarget,
    direction: VoteDirection,
) -> VoteOutcome {
    let mut repo = SqliteVoteRepository::try_new(conn).unwrap();
    repo.cast_vote(voter, target, direction).unwrap()
}

#[test]
fn casting_up_twice_creates_then_removes_the_vote() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let voter = Uuid::new_v4();
    let target = VoteTarget::Question(question_id);

    let first = cast(&mut conn, voter, target, VoteDirection::Up);
    assert!(matches!(first, VoteOutcome::Created { vote } if vote.direction == VoteDirection::Up));
    assert_eq!(question_votes(&conn, question_id), 1);
    assert_eq!(vote_row_count(&conn), 1);

    let second = cast(&mut conn, voter, target, VoteDirection::Up);
    assert!(matches!(
        second,
        VoteOutcome::Removed {
            direction: VoteDirection::Up
        }
    ));
    assert_eq!(question_votes(&conn, question_id), 0);
    assert_eq!(vote_row_count(&conn), 0);
}

#[test]
fn third_identical_cast_recreates_the_vote() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let voter = Uuid::new_v4();
    let target = VoteTarget::Question(question_id);

    cast(&mut conn, voter, target, VoteDirection::Up);
    cast(&mut conn, voter, target, VoteDirection::Up);
    let third = cast(&mut conn, voter, target, VoteDirection::Up);

    assert!(matches!(third, VoteOutcome::Created { .. }));
    assert_eq!(question_votes(&conn, question_id), 1);
    assert_eq!(vote_row_count(&conn), 1);
}

#[test]
fn opposite_direction_flips_the_same_row_in_place() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let answer_id = seed_answer(&mut conn, question_id);
    let voter = Uuid::new_v4();
    let target = VoteTarget::Answer(answer_id);

    let first = cast(&mut conn, voter, target, VoteDirection::Down);
    let first_id = match first {
        VoteOutcome::Created { vote } => vote.id,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(answer_votes(&conn, answer_id), -1);

    let second = cast(&mut conn, voter, target, VoteDirection::Up);
    match second {
        VoteOutcome::Flipped { from, vote } => {
            assert_eq!(from, VoteDirection::Down);
            assert_eq!(vote.direction, VoteDirection::Up);
            assert_eq!(vote.id, first_id, "flip must update the row in place");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(answer_votes(&conn, answer_id), 1);
    assert_eq!(vote_row_count(&conn), 1);
}

#[test]
fn question_and_answer_votes_are_independent_ledger_entries() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let answer_id = seed_answer(&mut conn, question_id);
    let voter = Uuid::new_v4();

    cast(
        &mut conn,
        voter,
        VoteTarget::Question(question_id),
        VoteDirection::Up,
    );
    cast(
        &mut conn,
        voter,
        VoteTarget::Answer(answer_id),
        VoteDirection::Down,
    );

    assert_eq!(question_votes(&conn, question_id), 1);
    assert_eq!(answer_votes(&conn, answer_id), -1);
    assert_eq!(vote_row_count(&conn), 2);

    // Toggling the question vote off must not disturb the answer vote.
    cast(
        &mut conn,
        voter,
        VoteTarget::Question(question_id),
        VoteDirection::Up,
    );
    assert_eq!(question_votes(&conn, question_id), 0);
    assert_eq!(answer_votes(&conn, answer_id), -1);
    assert_eq!(vote_row_count(&conn), 1);
}

#[test]
fn aggregate_always_equals_signed_sum_of_ledger_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let target = VoteTarget::Question(question_id);
    let voters: Vec<UserId> = (0..3).map(|_| Uuid::new_v4()).collect();

    let sequence = [
        (0, VoteDirection::Up),
        (1, VoteDirection::Down),
        (2, VoteDirection::Up),
        (0, VoteDirection::Down), // flip
        (1, VoteDirection::Down), // toggle off
        (2, VoteDirection::Up),   // toggle off
        (1, VoteDirection::Up),   // recreate
    ];

    for (voter_index, direction) in sequence {
        cast(&mut conn, voters[voter_index], target, direction);

        let ledger_sum: i64 = conn
            .query_row(
                "SELECT COALESCE(SUM(CASE direction WHEN 'up' THEN 1 ELSE -1 END), 0)
                 FROM votes
                 WHERE question_id = ?1;",
                [question_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(
            question_votes(&conn, question_id),
            ledger_sum,
            "aggregate drifted from ledger"
        );
    }
}

#[test]
fn get_vote_returns_current_state_only_for_matching_target() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let answer_id = seed_answer(&mut conn, question_id);
    let voter = Uuid::new_v4();

    cast(
        &mut conn,
        voter,
        VoteTarget::Question(question_id),
        VoteDirection::Down,
    );

    let repo = SqliteVoteRepository::try_new(&mut conn).unwrap();
    let held = repo
        .get_vote(voter, VoteTarget::Question(question_id))
        .unwrap()
        .unwrap();
    assert_eq!(held.direction, VoteDirection::Down);
    assert_eq!(held.target, VoteTarget::Question(question_id));

    assert!(repo
        .get_vote(voter, VoteTarget::Answer(answer_id))
        .unwrap()
        .is_none());
}

#[test]
fn vote_on_missing_target_is_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);

    let mut repo = SqliteVoteRepository::try_new(&mut conn).unwrap();
    let err = repo
        .cast_vote(Uuid::new_v4(), VoteTarget::Answer(999), VoteDirection::Up)
        .unwrap_err();
    assert!(matches!(err, RepoError::AnswerNotFound(999)));
    drop(repo);

    assert_eq!(vote_row_count(&conn), 0);
    assert_eq!(question_votes(&conn, question_id), 0);
}

#[test]
fn service_rejects_malformed_target_shapes() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let answer_id = seed_answer(&mut conn, question_id);

    let repo = SqliteVoteRepository::try_new(&mut conn).unwrap();
    let mut service = VoteService::new(repo);

    let neither = service
        .cast_vote(&VoteCastRequest {
            voter_id: Uuid::new_v4(),
            question_id: None,
            answer_id: None,
            direction: VoteDirection::Up,
        })
        .unwrap_err();
    assert!(matches!(
        neither,
        VoteServiceError::InvalidTarget(VoteTargetError::Missing)
    ));

    let both = service
        .cast_vote(&VoteCastRequest {
            voter_id: Uuid::new_v4(),
            question_id: Some(question_id),
            answer_id: Some(answer_id),
            direction: VoteDirection::Up,
        })
        .unwrap_err();
    assert!(matches!(
        both,
        VoteServiceError::InvalidTarget(VoteTargetError::Ambiguous)
    ));
    drop(service);

    assert_eq!(vote_row_count(&conn), 0);
}

#[test]
fn service_cast_applies_outcome_to_aggregate() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);
    let answer_id = seed_answer(&mut conn, question_id);

    let repo = SqliteVoteRepository::try_new(&mut conn).unwrap();
    let mut service = VoteService::new(repo);
    let voter = Uuid::new_v4();

    let outcome = service
        .cast_vote(&VoteCastRequest {
            voter_id: voter,
            question_id: None,
            answer_id: Some(answer_id),
            direction: VoteDirection::Up,
        })
        .unwrap();
    assert!(matches!(outcome, VoteOutcome::Created { .. }));

    let held = service
        .current_vote(voter, VoteTarget::Answer(answer_id))
        .unwrap()
        .unwrap();
    assert_eq!(held.direction, VoteDirection::Up);
    drop(service);

    assert_eq!(answer_votes(&conn, answer_id), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteVoteRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}
