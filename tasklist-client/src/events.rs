//! Change notifications for the local store
//!
//! Every write that changes rows publishes a [`StoreEvent`]. Live queries
//! subscribe to these events and re-run when their table changes.
//!
//! # Delivery
//!
//! - `emit` never blocks and never fails; with no subscribers the event is dropped
//! - Each subscriber sees events in the order they were emitted
//! - A subscriber that falls behind by more than the channel capacity is told it
//!   lagged; live queries treat that as "something changed" and re-query

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

/// Default broadcast channel capacity.
pub const DEFAULT_CHANGE_BUFFER: usize = 256;

/// Tables a live query can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Tasks,
    Preferences,
}

/// A committed change to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A task row was inserted (id assigned by the store if it was zero)
    TaskInserted { id: i64 },
    /// An existing task row was overwritten
    TaskUpdated { id: i64 },
    /// A task row was removed
    TaskDeleted { id: i64 },
    /// Every task row was removed
    AllTasksDeleted { count: u64 },
    /// A preference value was written
    PreferenceChanged { key: String },
}

impl StoreEvent {
    pub fn table(&self) -> Table {
        match self {
            StoreEvent::TaskInserted { .. }
            | StoreEvent::TaskUpdated { .. }
            | StoreEvent::TaskDeleted { .. }
            | StoreEvent::AllTasksDeleted { .. } => Table::Tasks,
            StoreEvent::PreferenceChanged { .. } => Table::Preferences,
        }
    }
}

/// Broadcast-based change notifier owned by the database
pub struct ChangeNotifier {
    tx: broadcast::Sender<StoreEvent>,
    emit_count: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANGE_BUFFER)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            emit_count: AtomicU64::new(0),
        }
    }

    /// Publish an event to all subscribers. Returns how many received it.
    pub fn emit(&self, event: StoreEvent) -> usize {
        tracing::debug!("EVENTS: {:?}", event);
        self.emit_count.fetch_add(1, Ordering::Relaxed);
        self.tx.send(event).unwrap_or(0)
    }

    pub fn emit_task_inserted(&self, id: i64) {
        self.emit(StoreEvent::TaskInserted { id });
    }

    pub fn emit_task_updated(&self, id: i64) {
        self.emit(StoreEvent::TaskUpdated { id });
    }

    pub fn emit_task_deleted(&self, id: i64) {
        self.emit(StoreEvent::TaskDeleted { id });
    }

    pub fn emit_all_tasks_deleted(&self, count: u64) {
        self.emit(StoreEvent::AllTasksDeleted { count });
    }

    pub fn emit_preference_changed(&self, key: &str) {
        self.emit(StoreEvent::PreferenceChanged {
            key: key.to_string(),
        });
    }

    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
