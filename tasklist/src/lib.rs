//! Tasklist - a local to-do list with live queries
//!
//! This crate provides a unified API over the task store, the sort
//! preference store and the two screen controllers.
//!
//! # Example
//!
//! ```ignore
//! use tasklist::{ClientConfig, ListController, SortPreferences};
//!
//! let (repository, prefs) = tasklist::open(&ClientConfig::from_env()?).await?;
//! let list = ListController::new(repository, prefs);
//! list.search("milk");
//! ```

// Re-export client types
pub use tasklist_client::{
    init_logging, open, ClientConfig, ClientDatabase, DetailController, ListController, LiveQuery,
    PreferenceStore, QueryState, SortPreferences, StoreEvent, TaskDraft, TaskRepository,
};

// Re-export core types that applications need
pub use tasklist_core::errors::ClientError;
pub use tasklist_core::models::{
    Action, ListView, Priority, SearchBarState, SortOrder, Task, NEW_TASK_ID,
};
pub use tasklist_core::resource::Resource;
pub use tasklist_core::TaskResult;
