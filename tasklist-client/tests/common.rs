use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tasklist_client::{ClientDatabase, LiveQuery, SortPreferences, TaskRepository};
use tasklist_core::{Priority, Task, TaskResult};
use tokio::sync::watch;

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a new in-memory test sqlite database and runs migrations.
#[allow(dead_code)]
pub async fn setup_test_db() -> Arc<ClientDatabase> {
    let db = ClientDatabase::new("sqlite::memory:").await.unwrap();
    db.run_migrations().await.unwrap();
    Arc::new(db)
}

/// Database plus the repository and sort preferences built on it.
#[allow(dead_code)]
pub async fn setup_repository() -> (Arc<ClientDatabase>, TaskRepository, SortPreferences) {
    let db = setup_test_db().await;
    let repository = TaskRepository::new(db.clone());
    let prefs = SortPreferences::from_database(db.clone());
    (db, repository, prefs)
}

#[allow(dead_code)]
pub fn make_task(id: i64, title: &str, description: &str, priority: Priority) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: description.to_string(),
        priority,
    }
}

/// Three tasks with MEDIUM, LOW and HIGH priority, ids 1..=3.
#[allow(dead_code)]
pub fn sample_tasks() -> Vec<Task> {
    vec![
        make_task(1, "Task 1", "Task 1 Description", Priority::Medium),
        make_task(2, "Task 2", "Task 1 Description", Priority::Low),
        make_task(3, "Task 3", "Task 3 Description", Priority::High),
    ]
}

#[allow(dead_code)]
pub async fn insert_all(repository: &TaskRepository, tasks: &[Task]) {
    for task in tasks {
        repository.add_task(task).await.unwrap();
    }
}

/// Next result from a live query, failing the test on timeout or end of stream.
#[allow(dead_code)]
pub async fn next_result<T>(stream: &mut LiveQuery<T>) -> TaskResult<T> {
    tokio::time::timeout(TIMEOUT, stream.next())
        .await
        .expect("timed out waiting for emission")
        .expect("live query ended")
}

#[allow(dead_code)]
pub async fn next_value<T>(stream: &mut LiveQuery<T>) -> T {
    next_result(stream).await.unwrap()
}

/// Waits until the watched state satisfies `predicate` and returns it.
#[allow(dead_code)]
pub async fn wait_for<T, P>(rx: &mut watch::Receiver<T>, mut predicate: P) -> T
where
    T: Clone,
    P: FnMut(&T) -> bool,
{
    let value = tokio::time::timeout(TIMEOUT, rx.wait_for(|v| predicate(v)))
        .await
        .expect("timed out waiting for state")
        .expect("state sender dropped");
    value.clone()
}

/// Polls until the store has exactly `expected` change subscribers.
#[allow(dead_code)]
pub async fn wait_for_subscribers(db: &ClientDatabase, expected: usize) {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while db.change_subscriber_count() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {} subscribers, found {}",
            expected,
            db.change_subscriber_count()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[allow(dead_code)]
pub fn priorities(tasks: &[Task]) -> Vec<Priority> {
    tasks.iter().map(|t| t.priority).collect()
}
