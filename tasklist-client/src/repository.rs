use std::sync::Arc;

use tasklist_core::{Task, TaskResult};

use crate::database::ClientDatabase;
use crate::live::LiveQuery;
use crate::queries::DbHelpers;

/// Query and mutation surface over the task store.
///
/// Reads are live: each returns a stream that re-emits when tasks change.
/// Writes are single store operations; a failure is returned as-is with no
/// compensation.
#[derive(Clone)]
pub struct TaskRepository {
    db: Arc<ClientDatabase>,
}

impl TaskRepository {
    pub fn new(db: Arc<ClientDatabase>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<ClientDatabase> {
        &self.db
    }

    pub fn get_all_tasks(&self) -> LiveQuery<Vec<Task>> {
        self.db.select_all()
    }

    pub fn get_selected_task(&self, task_id: i64) -> LiveQuery<Option<Task>> {
        self.db.select_by_id(task_id)
    }

    /// Tasks whose title or description contains `query`.
    ///
    /// This is the only place the text is turned into a `LIKE` pattern:
    /// callers pass what the user typed, and `%`, `_` and `\` in it match
    /// literally.
    pub fn search_tasks(&self, query: &str) -> LiveQuery<Vec<Task>> {
        tracing::debug!("REPOSITORY: Searching for {:?}", query);
        self.db
            .select_where_title_or_description_like(DbHelpers::contains_pattern(query))
    }

    /// Least urgent first.
    pub fn sort_by_low_priority(&self) -> LiveQuery<Vec<Task>> {
        self.db.select_all_order_by_priority_desc()
    }

    /// Most urgent first.
    pub fn sort_by_high_priority(&self) -> LiveQuery<Vec<Task>> {
        self.db.select_all_order_by_priority_asc()
    }

    pub async fn add_task(&self, task: &Task) -> TaskResult<()> {
        let id = self.db.insert_task(task).await?;
        tracing::info!("REPOSITORY: Added task {:?} as {}", task.title, id);
        Ok(())
    }

    pub async fn update_task(&self, task: &Task) -> TaskResult<()> {
        self.db.update_task(task).await?;
        Ok(())
    }

    pub async fn delete_task(&self, task: &Task) -> TaskResult<()> {
        self.db.delete_task(task).await?;
        Ok(())
    }

    pub async fn delete_all_tasks(&self) -> TaskResult<()> {
        self.db.delete_all_tasks().await?;
        Ok(())
    }
}
