//! View state for the task detail screen.

use std::sync::Arc;

use futures_util::StreamExt;
use tasklist_core::{Action, Priority, Resource, Task, TaskResult, NEW_TASK_ID};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::repository::TaskRepository;
use crate::state::{state_cell, QueryCell, QueryState, StateCell};
use crate::subscriptions::Subscriptions;

/// Editable copy of a task's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            description: String::new(),
            priority: Priority::Low,
        }
    }
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
        }
    }

    /// The draft as an existing task, keeping its id.
    pub fn to_task(&self) -> Task {
        Task {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
        }
    }

    /// The draft as a new task for the store to assign an id to.
    pub fn to_new_task(&self) -> Task {
        Task::new(self.title.clone(), self.description.clone(), self.priority)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DetailStream {
    SelectedTask,
}

/// Holds the fields being edited on the detail screen and commits them.
pub struct DetailController {
    repository: TaskRepository,
    max_title_length: usize,
    draft: StateCell<TaskDraft>,
    selected_task: QueryCell<Option<Task>>,
    subscriptions: Subscriptions<DetailStream>,
}

impl DetailController {
    pub fn new(repository: TaskRepository, max_title_length: usize) -> Self {
        Self {
            repository,
            max_title_length,
            draft: state_cell(TaskDraft::default()),
            selected_task: QueryCell::new(),
            subscriptions: Subscriptions::new(),
        }
    }

    pub fn with_config(repository: TaskRepository, config: &ClientConfig) -> Self {
        Self::new(repository, config.max_title_length)
    }

    /// Follows the task with `task_id`, copying it into the draft on every
    /// change. Does nothing for [`NEW_TASK_ID`].
    pub fn load_task(&self, task_id: i64) {
        if task_id == NEW_TASK_ID {
            return;
        }

        self.subscriptions.cancel(&DetailStream::SelectedTask);
        let run = self.selected_task.restart();

        let mut stream = self.repository.get_selected_task(task_id);
        let draft = self.draft.clone();
        let selected_task = self.selected_task.clone();

        let handle = tokio::spawn(async move {
            while let Some(result) = stream.next().await {
                match result {
                    Ok(task) => {
                        // the draft is only touched while this run is current
                        let stored = selected_task.publish_with(run, || {
                            draft.send_replace(
                                task.as_ref().map(TaskDraft::from_task).unwrap_or_default(),
                            );
                            Resource::Success(task)
                        });
                        if !stored {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("DETAIL: Loading task {} failed: {}", task_id, e);
                        selected_task.publish(run, Resource::Error(Arc::new(e)));
                        break;
                    }
                }
            }
        });
        self.subscriptions.replace(DetailStream::SelectedTask, handle);
    }

    /// Copies `task` into the draft, or resets the draft when `None`.
    pub fn update_task_fields(&self, task: Option<&Task>) {
        self.draft
            .send_replace(task.map(TaskDraft::from_task).unwrap_or_default());
    }

    /// Accepts the title only while it is shorter than the configured
    /// maximum. Returns whether it was accepted.
    pub fn set_title(&self, title: impl Into<String>) -> bool {
        let title = title.into();
        if title.chars().count() >= self.max_title_length {
            return false;
        }
        self.draft.send_modify(|draft| draft.title = title);
        true
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.draft.send_modify(|draft| draft.description = description);
    }

    pub fn set_priority(&self, priority: Priority) {
        self.draft.send_modify(|draft| draft.priority = priority);
    }

    /// True when both title and description are non-empty.
    ///
    /// [`commit`](Self::commit) does not check this; callers must.
    pub fn validate(&self) -> bool {
        let draft = self.draft.borrow();
        !draft.title.is_empty() && !draft.description.is_empty()
    }

    /// Sends `action` to the repository in the background.
    ///
    /// `Add` and `Undo` insert the draft as a new task, `Update` and `Delete`
    /// use the draft including its id, `DeleteAll` ignores the draft.
    /// `NoAction` touches nothing and returns `None`.
    pub fn commit(&self, action: Action) -> Option<JoinHandle<TaskResult<()>>> {
        let repository = self.repository.clone();
        let draft = self.draft();
        tracing::info!("DETAIL: Committing {} for task {}", action, draft.id);

        let handle = match action {
            Action::Add | Action::Undo => tokio::spawn(async move {
                log_failure(action, repository.add_task(&draft.to_new_task()).await)
            }),
            Action::Update => tokio::spawn(async move {
                log_failure(action, repository.update_task(&draft.to_task()).await)
            }),
            Action::Delete => tokio::spawn(async move {
                log_failure(action, repository.delete_task(&draft.to_task()).await)
            }),
            Action::DeleteAll => tokio::spawn(async move {
                log_failure(action, repository.delete_all_tasks().await)
            }),
            Action::NoAction => return None,
        };
        Some(handle)
    }

    pub fn cancel_all(&self) {
        self.subscriptions.cancel_all();
    }

    // ===== Snapshots =====

    pub fn draft(&self) -> TaskDraft {
        self.draft.borrow().clone()
    }

    pub fn id(&self) -> i64 {
        self.draft.borrow().id
    }

    pub fn title(&self) -> String {
        self.draft.borrow().title.clone()
    }

    pub fn description(&self) -> String {
        self.draft.borrow().description.clone()
    }

    pub fn priority(&self) -> Priority {
        self.draft.borrow().priority
    }

    pub fn selected_task(&self) -> QueryState<Option<Task>> {
        self.selected_task.get()
    }

    pub fn max_title_length(&self) -> usize {
        self.max_title_length
    }

    // ===== Observers =====

    pub fn watch_draft(&self) -> watch::Receiver<TaskDraft> {
        self.draft.subscribe()
    }

    pub fn watch_selected_task(&self) -> watch::Receiver<QueryState<Option<Task>>> {
        self.selected_task.subscribe()
    }
}

fn log_failure(action: Action, result: TaskResult<()>) -> TaskResult<()> {
    if let Err(e) = &result {
        tracing::error!("DETAIL: {} failed: {}", action, e);
    }
    result
}
