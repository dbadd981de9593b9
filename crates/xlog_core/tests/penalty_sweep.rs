use chrono::NaiveDate;
use rusqlite::Connection;
use xlog_core::db::open_db_in_memory;
use xlog_core::{
    DomainSetup, Element, PenaltyOutcome, PenaltySweeper, ProfileSetup, ProgressionService,
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
                elements: vec!["focus".to_string()],
            },
            DomainSetup {
                name: "Craft".to_string(),
                elements: vec!["coding".to_string()],
            },
            DomainSetup {
                name: "Social".to_string(),
                elements: vec!["empathy".to_string()],
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

fn sweep(conn: &mut Connection, today: NaiveDate) -> Vec<PenaltyOutcome> {
    PenaltySweeper::new(SqliteXpStore::new(conn))
        .sweep_overdue_penalties(today)
        .expect("sweep should succeed")
}

fn get_task(conn: &mut Connection, task_id: TaskId) -> Task {
    SqliteXpStore::new(conn)
        .get_task(task_id)
        .expect("task query should succeed")
        .expect("task should exist")
}

fn overdue_task(conn: &mut Connection, name: &str, kind: TaskKind) -> Task {
    let major = element(conn, "strength");
    let minor = element(conn, "endurance");
    let mut task = Task::new(name, kind, 7, major.id, minor.id);
    task.last_done = Some(date(2024, 1, 1));
    add_task(conn, &task);
    task
}

#[test]
fn overdue_task_is_penalized_once_per_day() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);
    let task = overdue_task(&mut conn, "weekly review", TaskKind::Quick);

    let today = date(2024, 1, 10);
    let applied = sweep(&mut conn, today);
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].task_id, task.id);
    assert_eq!(applied[0].major_deducted, 6);
    assert_eq!(applied[0].minor_deducted, 3);

    assert_eq!(element(&mut conn, "strength").xp, -6);
    assert_eq!(element(&mut conn, "endurance").xp, -3);
    assert_eq!(get_task(&mut conn, task.id).last_penalty_date, Some(today));

    // Second run on the same date is a no-op.
    assert!(sweep(&mut conn, today).is_empty());
    assert_eq!(element(&mut conn, "strength").xp, -6);
}

#[test]
fn penalty_leaves_completion_state_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);
    let major = element(&mut conn, "strength");
    let minor = element(&mut conn, "endurance");
    let mut task = Task::new("weekly review", TaskKind::Quick, 7, major.id, minor.id);
    task.last_done = Some(date(2024, 1, 1));
    task.streak = 3;
    add_task(&mut conn, &task);

    sweep(&mut conn, date(2024, 1, 10));

    let stored = get_task(&mut conn, task.id);
    assert_eq!(stored.last_done, Some(date(2024, 1, 1)));
    assert_eq!(stored.streak, 3);
}

#[test]
fn penalty_repeats_on_the_next_day() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);
    overdue_task(&mut conn, "weekly review", TaskKind::Quick);

    sweep(&mut conn, date(2024, 1, 10));
    let applied = sweep(&mut conn, date(2024, 1, 11));
    assert_eq!(applied.len(), 1);
    assert_eq!(element(&mut conn, "strength").xp, -12);
}

#[test]
fn one_time_tasks_are_never_penalized() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "focus");
    let mut task = Task::new("read the manual", TaskKind::Session, 0, major.id, major.id);
    task.last_done = Some(date(2024, 1, 1));
    add_task(&mut conn, &task);

    assert!(sweep(&mut conn, date(2030, 1, 1)).is_empty());
}

#[test]
fn inactive_tasks_are_skipped() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);
    let task = overdue_task(&mut conn, "weekly review", TaskKind::Quick);
    SqliteXpStore::new(&mut conn)
        .set_task_active(task.id, false)
        .unwrap();

    assert!(sweep(&mut conn, date(2024, 1, 10)).is_empty());
}

#[test]
fn never_completed_tasks_are_skipped() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "focus");
    let task = Task::new("new habit", TaskKind::Quick, 7, major.id, major.id);
    add_task(&mut conn, &task);

    assert!(sweep(&mut conn, date(2024, 6, 1)).is_empty());
}

#[test]
fn task_due_today_is_not_yet_overdue() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);
    overdue_task(&mut conn, "weekly review", TaskKind::Quick);

    // Due date is Jan 8; overdue starts strictly after it.
    assert!(sweep(&mut conn, date(2024, 1, 8)).is_empty());
    assert_eq!(sweep(&mut conn, date(2024, 1, 9)).len(), 1);
}

#[test]
fn penalty_uses_the_completion_pipeline_with_overdue_multiplier() {
    let mut conn = open_db_in_memory().unwrap();
    init_profile(&mut conn);

    let major = element(&mut conn, "strength");
    ProgressionService::new(SqliteXpStore::new(&mut conn))
        .set_focus(major.id)
        .unwrap();

    let minor = element(&mut conn, "endurance");
    let mut task = Task::new("side project", TaskKind::Grind, 7, major.id, minor.id);
    task.last_done = Some(date(2024, 1, 1));
    task.streak = 20;
    add_task(&mut conn, &task);

    let applied = sweep(&mut conn, date(2024, 1, 11));
    // Same numbers as the late-completion reference scenario.
    assert_eq!(applied[0].major_deducted, 99);
    assert_eq!(applied[0].minor_deducted, 59);
    assert_eq!(element(&mut conn, "strength").xp, -99);
    assert_eq!(element(&mut conn, "endurance").xp, -59);
}

#[test]
fn sweep_on_empty_store_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();
    let applied = PenaltySweeper::new(SqliteXpStore::new(&mut conn))
        .sweep_overdue_penalties(date(2024, 1, 1))
        .expect("sweep should succeed on empty store");
    assert!(applied.is_empty());
}
