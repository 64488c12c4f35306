pub mod config;
pub mod database;
pub mod detail;
pub mod events;
pub mod list;
pub mod live;
pub mod preferences;
pub mod queries;
pub mod repository;
pub mod state;
pub mod subscriptions;

pub use config::ClientConfig;
pub use database::ClientDatabase;
pub use detail::{DetailController, TaskDraft};
pub use events::{ChangeNotifier, StoreEvent, Table};
pub use list::ListController;
pub use live::LiveQuery;
pub use preferences::{PreferenceStore, SortPreferences, SORT_STATE_KEY};
pub use repository::TaskRepository;
pub use state::QueryState;

use std::sync::Arc;

use tasklist_core::TaskResult;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber. `RUST_LOG` wins over `default_filter`.
/// Calling it again once a subscriber is installed does nothing.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens the database described by `config`, applies migrations and builds
/// the repository and sort preferences on top of it.
pub async fn open(config: &ClientConfig) -> TaskResult<(TaskRepository, SortPreferences)> {
    let db = Arc::new(ClientDatabase::with_config(config).await?);
    db.run_migrations().await?;

    Ok((
        TaskRepository::new(db.clone()),
        SortPreferences::from_database(db),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::{Priority, Task};

    #[tokio::test]
    async fn test_open_in_memory() {
        let (repository, _prefs) = open(&ClientConfig::default()).await.unwrap();

        repository
            .add_task(&Task::new("Water plants", "Balcony only", Priority::Medium))
            .await
            .unwrap();

        let db = repository.database();
        assert_eq!(db.count_tasks().await.unwrap(), 1);
        let tasks = db.fetch_all_tasks().await.unwrap();
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[0].title, "Water plants");
    }

    #[tokio::test]
    async fn test_insert_with_existing_id_is_ignored() {
        let db = ClientDatabase::new("sqlite::memory:").await.unwrap();
        db.run_migrations().await.unwrap();

        let task = Task::new("First", "one", Priority::High).with_id(5);
        assert_eq!(db.insert_task(&task).await.unwrap(), 5);

        let duplicate = Task::new("Second", "two", Priority::Low).with_id(5);
        assert_eq!(db.insert_task(&duplicate).await.unwrap(), 0);

        let stored = db.fetch_task(5).await.unwrap().unwrap();
        assert_eq!(stored.title, "First");
        assert_eq!(db.notifier().emit_count(), 1);
    }

    #[tokio::test]
    async fn test_preference_round_trip() {
        let db = ClientDatabase::new("sqlite::memory:").await.unwrap();
        db.run_migrations().await.unwrap();

        assert_eq!(db.fetch_preference("sort_state").await.unwrap(), None);
        db.write_preference("sort_state", "LOW").await.unwrap();
        db.write_preference("sort_state", "HIGH").await.unwrap();
        assert_eq!(
            db.fetch_preference("sort_state").await.unwrap(),
            Some("HIGH".to_string())
        );
    }
}
