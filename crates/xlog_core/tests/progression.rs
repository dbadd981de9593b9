use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;
use xlog_core::db::open_db_in_memory;
use xlog_core::{
    CompletionOutcome, DomainSetup, Element, EngineError, ProfileSetup, ProgressionService,
    SetupService, SqliteXpStore, Task, TaskId, TaskKind, XpStore,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn init_profile(conn: &mut Connection) {
    let setup = ProfileSetup {
        user_name: "Rin".to_string(),
        domains: [
            DomainSetup {
                name: "Body".to_string(),
                elements: vec!["strength".to_string(), "endurance".to_string()],
            },
            DomainSetup {
                name: "Mind".to_string(),
                elements: vec!["focus".to_string(), "memory".to_string()],
            },
            DomainSetup {
                name: "Craft".to_string(),
                elements: vec!["coding".to_string(), "writing".to_string()],
            },
            DomainSetup {
                name: "Social".to_string(),
                elements: vec!["discipline".to_string(), "empathy".to_string()],
            },
        ],
        daily_login_element: None,
    };
    SetupService::new(SqliteXpStore::new(conn))
        .initialize_profile(&setup, date(2024, 1, 1))
        .expect("setup should succeed");
}

fn element(conn: &mut Connection, name: &str) -> Element {
    SqliteXpStore::new(conn)
        .get_element_by_name(name)
        .expect("element query should succeed")
        .expect("element should exist")
}

fn add_task(conn: &mut Connection, task: &Task) {
    SqliteXpStore::new(conn)
        .create_task(task)
        .expect("task insert should succeed");
}

fn complete(
    conn: &mut Connection,
    task_id: TaskId,
    today: NaiveDate,
) -> Result<CompletionOutcome, EngineError> {
    ProgressionService::new(SqliteXpStore::new(conn)).complete_task(task_id, today)
}

fn get_task(conn: &mut Connection, task_id: TaskId) -> Task {
    SqliteXpStore::new(conn)
        .get_task(task_id)
        .expect("task query should succeed")
        .expect("task should exist")
}

#[test]
fn unknown_task_reports_not_found_without_mutation() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let missing = Uuid::new_v4();
    let err = complete(&mut conn, missing, date(2024, 2, 1)).unwrap_err();
    assert!(matches!(err, EngineError::TaskNotFound(id) if id == missing));

    assert_eq!(element(&mut conn, "strength").xp, 0);
}

#[test]
fn quick_completion_awards_exact_base_amounts() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "strength");
    let minor = element(&mut conn, "endurance");
    let task = Task::new("morning run", TaskKind::Quick, 1, major.id, minor.id);
    add_task(&mut conn, &task);

    let today = date(2024, 2, 1);
    let outcome = complete(&mut conn, task.id, today).unwrap();
    assert_eq!(outcome.award.major, 10);
    assert_eq!(outcome.award.minor, 5);
    assert_eq!(outcome.new_streak, 1);
    assert!(!outcome.was_overdue);

    assert_eq!(element(&mut conn, "strength").xp, 10);
    assert_eq!(element(&mut conn, "endurance").xp, 5);

    let stored = get_task(&mut conn, task.id);
    assert_eq!(stored.last_done, Some(today));
    assert_eq!(stored.streak, 1);
}

#[test]
fn completing_twice_same_day_awards_twice() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "focus");
    let minor = element(&mut conn, "memory");
    let task = Task::new("review notes", TaskKind::Quick, 1, major.id, minor.id);
    add_task(&mut conn, &task);

    let today = date(2024, 2, 1);
    complete(&mut conn, task.id, today).unwrap();
    complete(&mut conn, task.id, today).unwrap();

    // No same-day dedupe: second run sees streak 1 (+1% bonus, rounds away).
    assert_eq!(element(&mut conn, "focus").xp, 20);
    assert_eq!(element(&mut conn, "memory").xp, 10);
    assert_eq!(get_task(&mut conn, task.id).streak, 2);
}

#[test]
fn focus_bonus_applies_to_both_amounts() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "coding");
    let minor = element(&mut conn, "writing");
    ProgressionService::new(SqliteXpStore::new(&mut conn))
        .set_focus(major.id)
        .unwrap();

    let task = Task::new("ship feature", TaskKind::Session, 7, major.id, minor.id);
    add_task(&mut conn, &task);

    let outcome = complete(&mut conn, task.id, date(2024, 2, 1)).unwrap();
    assert_eq!(outcome.award.major, 66);
    assert_eq!(outcome.award.minor, 33);
}

#[test]
fn streak_bonus_caps_at_twenty_percent() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "strength");
    let minor = element(&mut conn, "endurance");
    let mut task = Task::new("deep work", TaskKind::Grind, 0, major.id, minor.id);
    task.streak = 50;
    add_task(&mut conn, &task);

    let outcome = complete(&mut conn, task.id, date(2024, 2, 1)).unwrap();
    assert_eq!(outcome.award.major, 150);
    assert_eq!(outcome.award.minor, 90);
    assert_eq!(outcome.new_streak, 51);
}

#[test]
fn late_completion_keeps_sixty_percent() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "focus");
    let minor = element(&mut conn, "memory");
    let mut task = Task::new("weekly review", TaskKind::Quick, 7, major.id, minor.id);
    task.last_done = Some(date(2024, 1, 1));
    add_task(&mut conn, &task);

    // Due Jan 8; completing Jan 11 is late.
    let outcome = complete(&mut conn, task.id, date(2024, 1, 11)).unwrap();
    assert!(outcome.was_overdue);
    assert_eq!(outcome.award.major, 6);
    assert_eq!(outcome.award.minor, 3);
}

#[test]
fn completion_on_the_due_date_is_not_late() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "focus");
    let minor = element(&mut conn, "memory");
    let mut task = Task::new("weekly review", TaskKind::Quick, 7, major.id, minor.id);
    task.last_done = Some(date(2024, 1, 1));
    add_task(&mut conn, &task);

    let outcome = complete(&mut conn, task.id, date(2024, 1, 8)).unwrap();
    assert!(!outcome.was_overdue);
    assert_eq!(outcome.award.major, 10);
}

#[test]
fn grind_focus_full_streak_late_matches_reference_numbers() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "coding");
    let minor = element(&mut conn, "writing");
    ProgressionService::new(SqliteXpStore::new(&mut conn))
        .set_focus(major.id)
        .unwrap();

    let mut task = Task::new("side project", TaskKind::Grind, 7, major.id, minor.id);
    task.last_done = Some(date(2024, 1, 1));
    task.streak = 20;
    add_task(&mut conn, &task);

    // Three days past the Jan 8 due date.
    let outcome = complete(&mut conn, task.id, date(2024, 1, 11)).unwrap();
    assert_eq!(outcome.award.major, 99);
    assert_eq!(outcome.award.minor, 59);
}

#[test]
fn set_focus_clears_siblings_and_only_siblings() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let strength = element(&mut conn, "strength");
    let endurance = element(&mut conn, "endurance");
    let coding = element(&mut conn, "coding");

    {
        let mut progression = ProgressionService::new(SqliteXpStore::new(&mut conn));
        progression.set_focus(strength.id).unwrap();
        progression.set_focus(coding.id).unwrap();
    }
    assert!(element(&mut conn, "strength").is_focus);
    assert!(element(&mut conn, "coding").is_focus);

    // Moving focus within the Body domain clears strength, leaves coding.
    ProgressionService::new(SqliteXpStore::new(&mut conn))
        .set_focus(endurance.id)
        .unwrap();
    assert!(!element(&mut conn, "strength").is_focus);
    assert!(element(&mut conn, "endurance").is_focus);
    assert!(element(&mut conn, "coding").is_focus);
}

#[test]
fn set_focus_on_unknown_element_fails() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let missing = Uuid::new_v4();
    let err = ProgressionService::new(SqliteXpStore::new(&mut conn))
        .set_focus(missing)
        .unwrap_err();
    assert!(matches!(err, EngineError::ElementNotFound(id) if id == missing));
}
