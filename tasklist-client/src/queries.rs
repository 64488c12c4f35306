use sqlx::{sqlite::SqliteRow, Row};
use tasklist_core::{Priority, SortOrder, Task, TaskResult};

/// SQL queries for the task store and preference store
pub struct Queries;

impl Queries {
    // Task queries
    pub const SELECT_ALL_TASKS: &'static str = r#"
        SELECT id, title, description, priority
        FROM tasks
        ORDER BY id ASC
    "#;

    pub const SELECT_TASK_BY_ID: &'static str = r#"
        SELECT id, title, description, priority
        FROM tasks
        WHERE id = ?1
    "#;

    pub const SELECT_TASKS_LIKE: &'static str = r#"
        SELECT id, title, description, priority
        FROM tasks
        WHERE title LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\'
        ORDER BY id ASC
    "#;

    /// Descending ordinal over HIGH/MEDIUM/LOW, NONE last.
    pub const SELECT_TASKS_LOW_FIRST: &'static str = r#"
        SELECT id, title, description, priority
        FROM tasks
        ORDER BY (priority = 'NONE') ASC, CASE priority
            WHEN 'HIGH' THEN 0
            WHEN 'MEDIUM' THEN 1
            WHEN 'LOW' THEN 2
            ELSE 3
        END DESC, id ASC
    "#;

    pub const SELECT_TASKS_HIGH_FIRST: &'static str = r#"
        SELECT id, title, description, priority
        FROM tasks
        ORDER BY CASE priority
            WHEN 'HIGH' THEN 0
            WHEN 'MEDIUM' THEN 1
            WHEN 'LOW' THEN 2
            ELSE 3
        END ASC, id ASC
    "#;

    pub const COUNT_TASKS: &'static str = "SELECT COUNT(*) FROM tasks";

    /// A NULL id lets SQLite pick the next rowid.
    pub const INSERT_TASK: &'static str = r#"
        INSERT OR IGNORE INTO tasks (id, title, description, priority)
        VALUES (?1, ?2, ?3, ?4)
    "#;

    pub const UPDATE_TASK: &'static str = r#"
        UPDATE tasks
        SET title = ?2, description = ?3, priority = ?4
        WHERE id = ?1
    "#;

    pub const DELETE_TASK: &'static str = "DELETE FROM tasks WHERE id = ?1";

    pub const DELETE_ALL_TASKS: &'static str = "DELETE FROM tasks";

    // Preference queries
    pub const SELECT_PREFERENCE: &'static str = "SELECT value FROM preferences WHERE key = ?1";

    pub const UPSERT_PREFERENCE: &'static str = r#"
        INSERT INTO preferences (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
    "#;

    pub fn select_sorted(order: SortOrder) -> &'static str {
        match order {
            SortOrder::LowFirst => Self::SELECT_TASKS_LOW_FIRST,
            SortOrder::HighFirst => Self::SELECT_TASKS_HIGH_FIRST,
        }
    }
}

/// Helper functions for mapping tasks to and from rows
pub struct DbHelpers;

impl DbHelpers {
    pub fn parse_task(row: &SqliteRow) -> TaskResult<Task> {
        let priority: String = row.try_get("priority")?;

        Ok(Task {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            priority: Priority::from_name(&priority)?,
        })
    }

    pub fn parse_tasks(rows: Vec<SqliteRow>) -> TaskResult<Vec<Task>> {
        rows.iter().map(Self::parse_task).collect()
    }

    /// Id to bind on insert: `None` for tasks that have not been assigned one.
    pub fn insert_id(task: &Task) -> Option<i64> {
        (task.id != 0).then_some(task.id)
    }

    /// Wraps user text as a `LIKE` pattern matching it anywhere, with the
    /// wildcard characters in the text matched literally.
    pub fn contains_pattern(query: &str) -> String {
        let mut pattern = String::with_capacity(query.len() + 2);
        pattern.push('%');
        for ch in query.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}
