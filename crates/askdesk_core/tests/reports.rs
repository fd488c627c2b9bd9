use askdesk_core::db::open_db_in_memory;
use askdesk_core::{
    QuestionDraft, QuestionRepository, RepoError, ReportDraft, ReportResolution, ReportService,
    ReportServiceError, ReportStatus, ReportSubject, SqliteQuestionRepository,
    SqliteReportRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_question(conn: &mut Connection) -> i64 {
    let repo = SqliteQuestionRepository::try_new(conn).unwrap();
    repo.create_question(&QuestionDraft {
        title: "Spam target".to_string(),
        description: "Looks like an ad.".to_string(),
        category: "scanners".to_string(),
        tags: vec![],
        author_id: Uuid::new_v4(),
        author_name: "Dana".to_string(),
    })
    .unwrap()
}

#[test]
fn filed_report_starts_pending_and_lists_newest_first() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);

    let repo = SqliteReportRepository::try_new(&mut conn).unwrap();
    let mut service = ReportService::new(repo);

    let first = service
        .file_report(&ReportDraft {
            subject: ReportSubject::Question(question_id),
            reason: "spam".to_string(),
            details: None,
            reported_by: Uuid::new_v4(),
        })
        .unwrap();
    assert_eq!(first.status, ReportStatus::Pending);
    assert!(first.resolved_by.is_none());
    assert!(first.resolved_at.is_none());

    let second = service
        .file_report(&ReportDraft {
            subject: ReportSubject::Question(question_id),
            reason: "offensive".to_string(),
            details: Some("see last paragraph".to_string()),
            reported_by: Uuid::new_v4(),
        })
        .unwrap();

    let listed = service.list_reports().unwrap();
    assert_eq!(listed.len(), 2);
    // Equal timestamps fall back to id ordering, newest first.
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[test]
fn report_against_missing_subject_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    seed_question(&mut conn);

    let repo = SqliteReportRepository::try_new(&mut conn).unwrap();
    let mut service = ReportService::new(repo);

    let err = service
        .file_report(&ReportDraft {
            subject: ReportSubject::Answer(404),
            reason: "spam".to_string(),
            details: None,
            reported_by: Uuid::new_v4(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ReportServiceError::Repo(RepoError::AnswerNotFound(404))
    ));
    assert!(service.list_reports().unwrap().is_empty());
}

#[test]
fn resolving_a_pending_report_stamps_resolution_metadata() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);

    let repo = SqliteReportRepository::try_new(&mut conn).unwrap();
    let mut service = ReportService::new(repo);

    let report = service
        .file_report(&ReportDraft {
            subject: ReportSubject::Question(question_id),
            reason: "spam".to_string(),
            details: None,
            reported_by: Uuid::new_v4(),
        })
        .unwrap();

    let moderator = Uuid::new_v4();
    let resolved = service
        .resolve_report(report.id, moderator, ReportResolution::Resolved)
        .unwrap();
    assert_eq!(resolved.status, ReportStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(moderator));
    assert!(resolved.resolved_at.is_some());
}

#[test]
fn resolving_twice_or_missing_reports_fail_cleanly() {
    let mut conn = open_db_in_memory().unwrap();
    let question_id = seed_question(&mut conn);

    let repo = SqliteReportRepository::try_new(&mut conn).unwrap();
    let mut service = ReportService::new(repo);

    let report = service
        .file_report(&ReportDraft {
            subject: ReportSubject::Question(question_id),
            reason: "spam".to_string(),
            details: None,
            reported_by: Uuid::new_v4(),
        })
        .unwrap();
    service
        .resolve_report(report.id, Uuid::new_v4(), ReportResolution::Dismissed)
        .unwrap();

    let again = service
        .resolve_report(report.id, Uuid::new_v4(), ReportResolution::Resolved)
        .unwrap_err();
    assert!(matches!(again, ReportServiceError::AlreadyClosed(id) if id == report.id));

    let missing = service
        .resolve_report(9999, Uuid::new_v4(), ReportResolution::Resolved)
        .unwrap_err();
    assert!(matches!(missing, ReportServiceError::ReportNotFound(9999)));
}
