use askdesk_core::db::open_db;
use askdesk_core::{
    AnswerDraft, AnswerRepository, QuestionDraft, QuestionRepository, SqliteAnswerRepository,
    SqliteQuestionRepository, SqliteVoteRepository, VoteDirection, VoteRepository, VoteTarget,
};
use std::thread;
use uuid::Uuid;

// Two voters racing on the same answer from separate connections must
// serialize their read-modify-write cycles: starting from votes=5 the
// result is 7, never 6.
#[test]
fn concurrent_upvotes_from_two_connections_never_lose_an_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("askdesk.db");

    let answer_id = {
        let mut conn = open_db(&path).unwrap();
        let question_id = {
            let repo = SqliteQuestionRepository::try_new(&conn).unwrap();
            repo.create_question(&QuestionDraft {
                title: "Race on the vote counter".to_string(),
                description: "Two voters, one answer.".to_string(),
                category: "scanners".to_string(),
                tags: vec![],
                author_id: Uuid::new_v4(),
                author_name: "Dana".to_string(),
            })
            .unwrap()
        };
        let answer = {
            let mut repo = SqliteAnswerRepository::try_new(&mut conn).unwrap();
            repo.create_answer(&AnswerDraft {
                question_id,
                content: "Contended fix.".to_string(),
                author_id: Uuid::new_v4(),
                author_name: "Riley".to_string(),
            })
            .unwrap()
        };
        conn.execute("UPDATE answers SET votes = 5 WHERE id = ?1;", [answer.id])
            .unwrap();
        answer.id
    };

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let path = path.clone();
            thread::spawn(move || {
                let mut conn = open_db(&path).unwrap();
                let mut repo = SqliteVoteRepository::try_new(&mut conn).unwrap();
                repo.cast_vote(
                    Uuid::new_v4(),
                    VoteTarget::Answer(answer_id),
                    VoteDirection::Up,
                )
                .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let conn = open_db(&path).unwrap();
    let votes: i64 = conn
        .query_row("SELECT votes FROM answers WHERE id = ?1;", [answer_id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(votes, 7);

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM votes WHERE answer_id = ?1;",
            [answer_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 2);
}
