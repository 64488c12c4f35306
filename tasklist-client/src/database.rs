use std::str::FromStr;

use crate::config::ClientConfig;
use crate::events::{ChangeNotifier, Table};
use crate::live::{live_query, LiveQuery};
use crate::queries::{DbHelpers, Queries};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tasklist_core::{SortOrder, Task, TaskResult};

/// SQLite-backed task and preference store.
///
/// Every write that changes rows publishes a change event, which is what
/// keeps the `select_*` live queries up to date.
pub struct ClientDatabase {
    pub pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl ClientDatabase {
    pub async fn new(database_url: &str) -> TaskResult<Self> {
        Self::with_config(&ClientConfig::default().with_database_url(database_url)).await
    }

    pub async fn with_config(config: &ClientConfig) -> TaskResult<Self> {
        let options =
            SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

        // An in-memory database lives only as long as its connection
        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        tracing::info!("DATABASE: Opened {}", config.database_url);

        Ok(Self {
            pool,
            notifier: ChangeNotifier::with_capacity(config.change_buffer),
        })
    }

    pub async fn run_migrations(&self) -> TaskResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool. Reads and writes issued afterwards fail.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("DATABASE: Closed");
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Number of live queries (and other listeners) currently subscribed.
    pub fn change_subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    // ===== Writes =====

    /// Inserts a task, returning its id. A task whose non-zero id already
    /// exists is ignored and 0 is returned.
    pub async fn insert_task(&self, task: &Task) -> TaskResult<i64> {
        let result = sqlx::query(Queries::INSERT_TASK)
            .bind(DbHelpers::insert_id(task))
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("DATABASE: Task {} already exists, insert ignored", task.id);
            return Ok(0);
        }

        let id = result.last_insert_rowid();
        tracing::info!("DATABASE: Inserted task {} ({})", id, task.priority);
        self.notifier.emit_task_inserted(id);
        Ok(id)
    }

    pub async fn update_task(&self, task: &Task) -> TaskResult<u64> {
        let result = sqlx::query(Queries::UPDATE_TASK)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority.to_string())
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        tracing::info!("DATABASE: Updated task {}, rows affected: {}", task.id, rows);
        if rows > 0 {
            self.notifier.emit_task_updated(task.id);
        }
        Ok(rows)
    }

    pub async fn delete_task(&self, task: &Task) -> TaskResult<u64> {
        let result = sqlx::query(Queries::DELETE_TASK)
            .bind(task.id)
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        tracing::info!("DATABASE: Deleted task {}, rows affected: {}", task.id, rows);
        if rows > 0 {
            self.notifier.emit_task_deleted(task.id);
        }
        Ok(rows)
    }

    pub async fn delete_all_tasks(&self) -> TaskResult<u64> {
        let result = sqlx::query(Queries::DELETE_ALL_TASKS)
            .execute(&self.pool)
            .await?;

        let rows = result.rows_affected();
        tracing::info!("DATABASE: Deleted all tasks, rows affected: {}", rows);
        if rows > 0 {
            self.notifier.emit_all_tasks_deleted(rows);
        }
        Ok(rows)
    }

    pub async fn write_preference(&self, key: &str, value: &str) -> TaskResult<()> {
        sqlx::query(Queries::UPSERT_PREFERENCE)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        tracing::info!("DATABASE: Stored preference {} = {}", key, value);
        self.notifier.emit_preference_changed(key);
        Ok(())
    }

    // ===== One-shot reads =====

    pub async fn fetch_all_tasks(&self) -> TaskResult<Vec<Task>> {
        fetch_tasks(&self.pool, Queries::SELECT_ALL_TASKS).await
    }

    pub async fn fetch_task(&self, id: i64) -> TaskResult<Option<Task>> {
        fetch_task(&self.pool, id).await
    }

    /// `pattern` is a raw SQL `LIKE` pattern with `\` as the escape character.
    pub async fn fetch_tasks_like(&self, pattern: &str) -> TaskResult<Vec<Task>> {
        fetch_tasks_like(&self.pool, pattern).await
    }

    pub async fn fetch_tasks_by_priority(&self, order: SortOrder) -> TaskResult<Vec<Task>> {
        fetch_tasks(&self.pool, Queries::select_sorted(order)).await
    }

    pub async fn count_tasks(&self) -> TaskResult<i64> {
        let count: i64 = sqlx::query_scalar(Queries::COUNT_TASKS)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn fetch_preference(&self, key: &str) -> TaskResult<Option<String>> {
        fetch_preference(&self.pool, key).await
    }

    // ===== Live reads =====

    pub fn select_all(&self) -> LiveQuery<Vec<Task>> {
        let pool = self.pool.clone();
        live_query(self.notifier.subscribe(), Table::Tasks, move || {
            let pool = pool.clone();
            async move { fetch_tasks(&pool, Queries::SELECT_ALL_TASKS).await }
        })
    }

    /// Emits `None` while no row has this id.
    pub fn select_by_id(&self, id: i64) -> LiveQuery<Option<Task>> {
        let pool = self.pool.clone();
        live_query(self.notifier.subscribe(), Table::Tasks, move || {
            let pool = pool.clone();
            async move { fetch_task(&pool, id).await }
        })
    }

    pub fn select_where_title_or_description_like(
        &self,
        pattern: impl Into<String>,
    ) -> LiveQuery<Vec<Task>> {
        let pool = self.pool.clone();
        let pattern = pattern.into();
        live_query(self.notifier.subscribe(), Table::Tasks, move || {
            let pool = pool.clone();
            let pattern = pattern.clone();
            async move { fetch_tasks_like(&pool, &pattern).await }
        })
    }

    /// LOW, MEDIUM, HIGH, then NONE.
    pub fn select_all_order_by_priority_desc(&self) -> LiveQuery<Vec<Task>> {
        self.select_sorted(SortOrder::LowFirst)
    }

    /// Ascending ordinal: HIGH, MEDIUM, LOW, NONE.
    pub fn select_all_order_by_priority_asc(&self) -> LiveQuery<Vec<Task>> {
        self.select_sorted(SortOrder::HighFirst)
    }

    fn select_sorted(&self, order: SortOrder) -> LiveQuery<Vec<Task>> {
        let pool = self.pool.clone();
        live_query(self.notifier.subscribe(), Table::Tasks, move || {
            let pool = pool.clone();
            async move { fetch_tasks(&pool, Queries::select_sorted(order)).await }
        })
    }

    pub fn select_preference(&self, key: &str) -> LiveQuery<Option<String>> {
        let pool = self.pool.clone();
        let key = key.to_string();
        live_query(self.notifier.subscribe(), Table::Preferences, move || {
            let pool = pool.clone();
            let key = key.clone();
            async move { fetch_preference(&pool, &key).await }
        })
    }
}

async fn fetch_tasks(pool: &SqlitePool, sql: &'static str) -> TaskResult<Vec<Task>> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    DbHelpers::parse_tasks(rows)
}

async fn fetch_tasks_like(pool: &SqlitePool, pattern: &str) -> TaskResult<Vec<Task>> {
    let rows = sqlx::query(Queries::SELECT_TASKS_LIKE)
        .bind(pattern)
        .fetch_all(pool)
        .await?;
    DbHelpers::parse_tasks(rows)
}

async fn fetch_task(pool: &SqlitePool, id: i64) -> TaskResult<Option<Task>> {
    let row = sqlx::query(Queries::SELECT_TASK_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(DbHelpers::parse_task).transpose()
}

async fn fetch_preference(pool: &SqlitePool, key: &str) -> TaskResult<Option<String>> {
    let value: Option<String> = sqlx::query_scalar(Queries::SELECT_PREFERENCE)
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}
