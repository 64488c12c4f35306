use std::sync::Arc;

use futures_util::{future, stream, StreamExt};
use tasklist_core::{Priority, TaskResult};

use crate::database::ClientDatabase;
use crate::live::LiveQuery;

/// Key under which the last chosen sort order is stored.
pub const SORT_STATE_KEY: &str = "sort_state";

/// Small persisted key-value store living next to the task table.
#[derive(Clone)]
pub struct PreferenceStore {
    db: Arc<ClientDatabase>,
}

impl PreferenceStore {
    pub fn new(db: Arc<ClientDatabase>) -> Self {
        Self { db }
    }

    pub async fn write_string(&self, key: &str, value: &str) -> TaskResult<()> {
        self.db.write_preference(key, value).await
    }

    /// Live value for `key`; `None` while nothing has been written.
    pub fn read_string(&self, key: &str) -> LiveQuery<Option<String>> {
        self.db.select_preference(key)
    }
}

/// The persisted sort order, stored as the priority's literal name.
#[derive(Clone)]
pub struct SortPreferences {
    store: PreferenceStore,
}

impl SortPreferences {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    pub fn from_database(db: Arc<ClientDatabase>) -> Self {
        Self::new(PreferenceStore::new(db))
    }

    pub async fn persist_sort_state(&self, priority: Priority) -> TaskResult<()> {
        self.store
            .write_string(SORT_STATE_KEY, &priority.to_string())
            .await
    }

    /// Emits nothing until a sort order has been stored. An unknown stored
    /// name is yielded as `Err(UnknownPriority)` and ends the stream.
    pub fn read_sort_state(&self) -> LiveQuery<Priority> {
        let decoded = self
            .store
            .read_string(SORT_STATE_KEY)
            .filter_map(|value| {
                future::ready(match value {
                    Ok(Some(name)) => Some(Priority::from_name(&name)),
                    Ok(None) => None,
                    Err(e) => Some(Err(e)),
                })
            })
            .boxed();

        // the inner query is dropped with the first error, releasing its subscription
        stream::unfold(Some(decoded), |inner| async move {
            let mut inner = inner?;
            let item = inner.next().await?;
            let rest = if item.is_err() { None } else { Some(inner) };
            Some((item, rest))
        })
        .boxed()
    }
}
