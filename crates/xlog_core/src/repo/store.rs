//! XP store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the persistence gateway the progression engine, penalty
//!   sweeper and snapshot logger consume.
//! - Keep all SQL inside this boundary.
//!
//! # Invariants
//! - `initialize` writes the profile, taxonomy and daily-login task in one
//!   transaction; a failed setup leaves no partial rows behind.
//! - `apply_completion` updates two element rows and the task row in one
//!   transaction.
//! - `apply_penalty` carries the once-per-day guard inside the same
//!   transaction as the XP deduction (atomic check-and-update).
//! - `insert_xp_history` is conflict-ignoring, making the daily snapshot an
//!   atomic check-and-insert.

use crate::model::domain::{Domain, DomainId, Element, ElementId};
use crate::model::history::{Profile, XpHistoryEntry};
use crate::model::task::{Task, TaskId, TaskKind};
use crate::model::DOMAIN_COUNT;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    kind,
    frequency_days,
    major_element,
    minor_element,
    last_done,
    streak,
    active,
    last_penalty_date
FROM tasks";

const ELEMENT_SELECT_SQL: &str =
    "SELECT uuid, domain_uuid, name, is_focus, xp FROM elements";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistence gateway for the XP engine.
///
/// One implementation object owns the write path; all XP mutations are
/// serialized through it (single-writer model).
pub trait XpStore {
    // === Profile & setup ===

    /// Reads the singleton profile row, if setup has run.
    fn get_profile(&self) -> RepoResult<Option<Profile>>;

    /// Writes the singleton profile, the domain taxonomy with its elements,
    /// and the optional daily-login task in one transaction. A failure on
    /// any row leaves the store untouched.
    fn initialize(
        &mut self,
        profile: &Profile,
        taxonomy: &[(Domain, Vec<Element>)],
        daily_login: Option<&Task>,
    ) -> RepoResult<()>;

    // === Domains & elements ===

    /// Lists all domains ordered by position.
    fn list_domains(&self) -> RepoResult<Vec<Domain>>;
    /// Lists all elements of a domain ordered by name.
    fn list_elements(&self, domain_id: DomainId) -> RepoResult<Vec<Element>>;
    /// Gets one element by id.
    fn get_element(&self, id: ElementId) -> RepoResult<Option<Element>>;
    /// Gets one element by name (first match; names are unique per domain).
    fn get_element_by_name(&self, name: &str) -> RepoResult<Option<Element>>;
    /// Sums element XP for a domain; 0 when the domain has no elements.
    fn sum_domain_xp(&self, domain_id: DomainId) -> RepoResult<f64>;
    /// Clears `is_focus` on every element of `domain_id`, then sets it on
    /// `element_id`, atomically.
    fn set_focus_element(&mut self, domain_id: DomainId, element_id: ElementId) -> RepoResult<()>;

    // === Tasks ===

    /// Inserts one task after validation.
    fn create_task(&mut self, task: &Task) -> RepoResult<()>;
    /// Gets one task by id.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Gets one task by its unique name.
    fn get_task_by_name(&self, name: &str) -> RepoResult<Option<Task>>;
    /// Updates the user-editable definition fields (name, kind, frequency,
    /// element references). Completion and penalty state are untouched.
    fn update_task_definition(&mut self, task: &Task) -> RepoResult<()>;
    /// Deletes one task.
    fn delete_task(&mut self, id: TaskId) -> RepoResult<()>;
    /// Pauses or resumes one task.
    fn set_task_active(&mut self, id: TaskId, active: bool) -> RepoResult<()>;
    /// Lists active tasks that are due on `today` (never completed, or due
    /// date reached).
    fn list_due_tasks(&self, today: NaiveDate) -> RepoResult<Vec<Task>>;
    /// Lists active recurring tasks that are overdue on `today` and have not
    /// been penalized on `today` yet.
    fn list_overdue_unpenalized(&self, today: NaiveDate) -> RepoResult<Vec<Task>>;
    /// Applies a completion award in one transaction: adds the deltas to the
    /// major/minor elements, sets `last_done = today`, increments `streak`.
    fn apply_completion(
        &mut self,
        task: &Task,
        major_delta: i64,
        minor_delta: i64,
        today: NaiveDate,
    ) -> RepoResult<()>;
    /// Applies an overdue penalty in one transaction. Returns `false` when
    /// the once-per-day guard filtered the task (already penalized today),
    /// in which case nothing was written.
    fn apply_penalty(
        &mut self,
        task: &Task,
        major_delta: i64,
        minor_delta: i64,
        today: NaiveDate,
    ) -> RepoResult<bool>;

    // === XP history ===

    /// Whether a history row exists for `date`.
    fn xp_history_exists(&self, date: NaiveDate) -> RepoResult<bool>;
    /// Inserts one history row, ignoring the insert when a row for the same
    /// date already exists. Returns whether the row was inserted.
    fn insert_xp_history(&mut self, entry: &XpHistoryEntry) -> RepoResult<bool>;
    /// Full history log, ascending by date.
    fn list_xp_history(&self) -> RepoResult<Vec<XpHistoryEntry>>;
}

/// SQLite-backed XP store.
pub struct SqliteXpStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteXpStore<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl XpStore for SqliteXpStore<'_> {
    fn get_profile(&self) -> RepoResult<Option<Profile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_name, created_at FROM profile WHERE id = 1;")?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            let created_text: String = row.get(1)?;
            return Ok(Some(Profile {
                user_name: row.get(0)?,
                created_at: parse_db_date(&created_text, "profile.created_at")?,
            }));
        }
        Ok(None)
    }

    fn initialize(
        &mut self,
        profile: &Profile,
        taxonomy: &[(Domain, Vec<Element>)],
        daily_login: Option<&Task>,
    ) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO profile (id, user_name, created_at) VALUES (1, ?1, ?2);",
            params![profile.user_name, date_to_db(profile.created_at)],
        )?;
        for (domain, elements) in taxonomy {
            tx.execute(
                "INSERT INTO domains (uuid, name, position) VALUES (?1, ?2, ?3);",
                params![domain.id.to_string(), domain.name, domain.position as i64],
            )?;
            for element in elements {
                tx.execute(
                    "INSERT INTO elements (uuid, domain_uuid, name, is_focus, xp)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        element.id.to_string(),
                        element.domain_id.to_string(),
                        element.name,
                        bool_to_int(element.is_focus),
                        element.xp,
                    ],
                )?;
            }
        }
        if let Some(task) = daily_login {
            insert_task(&tx, task)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn list_domains(&self) -> RepoResult<Vec<Domain>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, position FROM domains ORDER BY position;")?;
        let mut rows = stmt.query([])?;
        let mut domains = Vec::with_capacity(DOMAIN_COUNT);
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let position: i64 = row.get(2)?;
            domains.push(Domain {
                id: parse_uuid(&uuid_text, "domains.uuid")?,
                name: row.get(1)?,
                position: position as usize,
            });
        }
        Ok(domains)
    }

    fn list_elements(&self, domain_id: DomainId) -> RepoResult<Vec<Element>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ELEMENT_SELECT_SQL} WHERE domain_uuid = ?1 ORDER BY name;"
        ))?;
        let mut rows = stmt.query([domain_id.to_string()])?;
        let mut elements = Vec::new();
        while let Some(row) = rows.next()? {
            elements.push(parse_element_row(row)?);
        }
        Ok(elements)
    }

    fn get_element(&self, id: ElementId) -> RepoResult<Option<Element>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ELEMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_element_row(row)?));
        }
        Ok(None)
    }

    fn get_element_by_name(&self, name: &str) -> RepoResult<Option<Element>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ELEMENT_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_element_row(row)?));
        }
        Ok(None)
    }

    fn sum_domain_xp(&self, domain_id: DomainId) -> RepoResult<f64> {
        let sum = self.conn.query_row(
            "SELECT COALESCE(SUM(xp), 0) FROM elements WHERE domain_uuid = ?1;",
            [domain_id.to_string()],
            |row| row.get::<_, f64>(0),
        )?;
        Ok(sum)
    }

    fn set_focus_element(&mut self, domain_id: DomainId, element_id: ElementId) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE elements SET is_focus = 0 WHERE domain_uuid = ?1;",
            [domain_id.to_string()],
        )?;
        let changed = tx.execute(
            "UPDATE elements SET is_focus = 1 WHERE uuid = ?1 AND domain_uuid = ?2;",
            params![element_id.to_string(), domain_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::ElementNotFound(element_id));
        }
        tx.commit()?;
        Ok(())
    }

    fn create_task(&mut self, task: &Task) -> RepoResult<()> {
        insert_task(self.conn, task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn get_task_by_name(&self, name: &str) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn update_task_definition(&mut self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                name = ?1,
                kind = ?2,
                frequency_days = ?3,
                major_element = ?4,
                minor_element = ?5
             WHERE uuid = ?6;",
            params![
                task.name,
                kind_to_db(task.kind),
                i64::from(task.frequency_days),
                task.major_element.to_string(),
                task.minor_element.to_string(),
                task.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(task.id));
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }
        Ok(())
    }

    fn set_task_active(&mut self, id: TaskId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET active = ?1 WHERE uuid = ?2;",
            params![bool_to_int(active), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }
        Ok(())
    }

    fn list_due_tasks(&self, today: NaiveDate) -> RepoResult<Vec<Task>> {
        let tasks = self.list_active_tasks()?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.is_due(today))
            .collect())
    }

    fn list_overdue_unpenalized(&self, today: NaiveDate) -> RepoResult<Vec<Task>> {
        // The date guard is re-checked atomically inside `apply_penalty`;
        // this listing only narrows the candidate set.
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE active = 1
               AND frequency_days > 0
               AND last_done IS NOT NULL
               AND (last_penalty_date IS NULL OR last_penalty_date != ?1)
             ORDER BY name;"
        ))?;
        let mut rows = stmt.query([date_to_db(today)])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            let task = parse_task_row(row)?;
            if task.is_overdue(today) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    fn apply_completion(
        &mut self,
        task: &Task,
        major_delta: i64,
        minor_delta: i64,
        today: NaiveDate,
    ) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        add_element_xp(&tx, task.major_element, major_delta)?;
        add_element_xp(&tx, task.minor_element, minor_delta)?;
        let changed = tx.execute(
            "UPDATE tasks SET last_done = ?1, streak = streak + 1 WHERE uuid = ?2;",
            params![date_to_db(today), task.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(task.id));
        }
        tx.commit()?;
        Ok(())
    }

    fn apply_penalty(
        &mut self,
        task: &Task,
        major_delta: i64,
        minor_delta: i64,
        today: NaiveDate,
    ) -> RepoResult<bool> {
        let tx = self.conn.transaction()?;
        // Guard and stamp in one statement so a concurrent sweep of the same
        // task on the same date cannot double-apply.
        let claimed = tx.execute(
            "UPDATE tasks
             SET last_penalty_date = ?1
             WHERE uuid = ?2
               AND active = 1
               AND (last_penalty_date IS NULL OR last_penalty_date != ?1);",
            params![date_to_db(today), task.id.to_string()],
        )?;
        if claimed == 0 {
            return Ok(false);
        }
        add_element_xp(&tx, task.major_element, major_delta)?;
        add_element_xp(&tx, task.minor_element, minor_delta)?;
        tx.commit()?;
        Ok(true)
    }

    fn xp_history_exists(&self, date: NaiveDate) -> RepoResult<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM xp_log WHERE date = ?1;")?;
        let exists = stmt.exists([date_to_db(date)])?;
        Ok(exists)
    }

    fn insert_xp_history(&mut self, entry: &XpHistoryEntry) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO xp_log (date, profile_xp, domain1_xp, domain2_xp, domain3_xp, domain4_xp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(date) DO NOTHING;",
            params![
                date_to_db(entry.date),
                entry.profile_xp,
                entry.domain_xp[0],
                entry.domain_xp[1],
                entry.domain_xp[2],
                entry.domain_xp[3],
            ],
        )?;
        Ok(inserted > 0)
    }

    fn list_xp_history(&self) -> RepoResult<Vec<XpHistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, profile_xp, domain1_xp, domain2_xp, domain3_xp, domain4_xp
             FROM xp_log ORDER BY date;",
        )?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let date_text: String = row.get(0)?;
            entries.push(XpHistoryEntry {
                date: parse_db_date(&date_text, "xp_log.date")?,
                profile_xp: row.get(1)?,
                domain_xp: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?],
            });
        }
        Ok(entries)
    }
}

impl SqliteXpStore<'_> {
    fn list_active_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE active = 1 ORDER BY name;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

fn insert_task(conn: &Connection, task: &Task) -> RepoResult<()> {
    task.validate()?;

    conn.execute(
        "INSERT INTO tasks (
            uuid,
            name,
            kind,
            frequency_days,
            major_element,
            minor_element,
            last_done,
            streak,
            active,
            last_penalty_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        params![
            task.id.to_string(),
            task.name,
            kind_to_db(task.kind),
            i64::from(task.frequency_days),
            task.major_element.to_string(),
            task.minor_element.to_string(),
            task.last_done.map(date_to_db),
            i64::from(task.streak),
            bool_to_int(task.active),
            task.last_penalty_date.map(date_to_db),
        ],
    )?;
    Ok(())
}

fn add_element_xp(
    tx: &rusqlite::Transaction<'_>,
    element_id: ElementId,
    delta: i64,
) -> RepoResult<()> {
    let changed = tx.execute(
        "UPDATE elements SET xp = xp + ?1 WHERE uuid = ?2;",
        params![delta, element_id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::ElementNotFound(element_id));
    }
    Ok(())
}

fn parse_element_row(row: &Row<'_>) -> RepoResult<Element> {
    let uuid_text: String = row.get("uuid")?;
    let domain_text: String = row.get("domain_uuid")?;
    Ok(Element {
        id: parse_uuid(&uuid_text, "elements.uuid")?,
        domain_id: parse_uuid(&domain_text, "elements.domain_uuid")?,
        name: row.get("name")?,
        is_focus: parse_bool(row.get("is_focus")?, "elements.is_focus")?,
        xp: row.get("xp")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let kind_text: String = row.get("kind")?;
    let major_text: String = row.get("major_element")?;
    let minor_text: String = row.get("minor_element")?;
    let frequency: i64 = row.get("frequency_days")?;
    let streak: i64 = row.get("streak")?;

    let task = Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        name: row.get("name")?,
        kind: parse_kind(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid task kind `{kind_text}` in tasks.kind"))
        })?,
        frequency_days: u32::try_from(frequency).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid frequency `{frequency}` in tasks.frequency_days"
            ))
        })?,
        major_element: parse_uuid(&major_text, "tasks.major_element")?,
        minor_element: parse_uuid(&minor_text, "tasks.minor_element")?,
        last_done: parse_optional_date(row.get("last_done")?, "tasks.last_done")?,
        streak: u32::try_from(streak).map_err(|_| {
            RepoError::InvalidData(format!("invalid streak `{streak}` in tasks.streak"))
        })?,
        active: parse_bool(row.get("active")?, "tasks.active")?,
        last_penalty_date: parse_optional_date(
            row.get("last_penalty_date")?,
            "tasks.last_penalty_date",
        )?,
    };
    task.validate()?;
    Ok(task)
}

fn kind_to_db(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Quick => "quick",
        TaskKind::Session => "session",
        TaskKind::Grind => "grind",
    }
}

fn parse_kind(value: &str) -> Option<TaskKind> {
    match value {
        "quick" => Some(TaskKind::Quick),
        "session" => Some(TaskKind::Session),
        "grind" => Some(TaskKind::Grind),
        _ => None,
    }
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_db_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

fn parse_optional_date(value: Option<String>, column: &str) -> RepoResult<Option<NaiveDate>> {
    match value {
        Some(text) => Ok(Some(parse_db_date(&text, column)?)),
        None => Ok(None),
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
