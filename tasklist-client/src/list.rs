//! View state for the task list screen.

use tasklist_core::{ListView, Priority, SearchBarState, Task, TaskResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::preferences::SortPreferences;
use crate::repository::TaskRepository;
use crate::state::{collect_into, state_cell, QueryCell, QueryState, StateCell};
use crate::subscriptions::Subscriptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ListStream {
    AllTasks,
    SearchResults,
    SortState,
    LowPriority,
    HighPriority,
}

/// Holds the list screen's state and runs its queries.
///
/// Must be created inside a Tokio runtime: construction starts loading all
/// tasks and both priority-sorted lists. Dropping the controller cancels
/// every query it started.
pub struct ListController {
    repository: TaskRepository,
    sort_preferences: SortPreferences,
    search_bar: StateCell<SearchBarState>,
    search_text: StateCell<String>,
    all_tasks: QueryCell<Vec<Task>>,
    searched_tasks: QueryCell<Vec<Task>>,
    low_priority_tasks: QueryCell<Vec<Task>>,
    high_priority_tasks: QueryCell<Vec<Task>>,
    sort_state: QueryCell<Priority>,
    subscriptions: Subscriptions<ListStream>,
}

impl ListController {
    pub fn new(repository: TaskRepository, sort_preferences: SortPreferences) -> Self {
        let controller = Self {
            repository,
            sort_preferences,
            search_bar: state_cell(SearchBarState::Closed),
            search_text: state_cell(String::new()),
            all_tasks: QueryCell::new(),
            searched_tasks: QueryCell::new(),
            low_priority_tasks: QueryCell::new(),
            high_priority_tasks: QueryCell::new(),
            sort_state: QueryCell::new(),
            subscriptions: Subscriptions::new(),
        };

        controller.load_all_tasks();
        controller.observe_sorted_tasks();
        controller
    }

    // ===== Queries =====

    /// Restarts the all-tasks query.
    pub fn load_all_tasks(&self) {
        self.subscriptions.cancel(&ListStream::AllTasks);
        let run = self.all_tasks.restart();

        let handle = collect_into(
            "all tasks",
            self.repository.get_all_tasks(),
            self.all_tasks.clone(),
            run,
        );
        self.subscriptions.replace(ListStream::AllTasks, handle);
    }

    /// Starts a search for `query` and marks the search bar as triggered.
    pub fn search(&self, query: &str) {
        tracing::info!("LIST: Searching for {:?}", query);
        self.subscriptions.cancel(&ListStream::SearchResults);
        let run = self.searched_tasks.restart();

        let handle = collect_into(
            "search",
            self.repository.search_tasks(query),
            self.searched_tasks.clone(),
            run,
        );
        self.subscriptions.replace(ListStream::SearchResults, handle);

        self.search_bar.send_replace(SearchBarState::Triggered);
    }

    /// Starts observing the stored sort order.
    pub fn read_sort_state(&self) {
        self.subscriptions.cancel(&ListStream::SortState);
        let run = self.sort_state.restart();

        let handle = collect_into(
            "sort state",
            self.sort_preferences.read_sort_state(),
            self.sort_state.clone(),
            run,
        );
        self.subscriptions.replace(ListStream::SortState, handle);
    }

    fn observe_sorted_tasks(&self) {
        let low = collect_into(
            "low priority tasks",
            self.repository.sort_by_low_priority(),
            self.low_priority_tasks.clone(),
            self.low_priority_tasks.restart(),
        );
        self.subscriptions.replace(ListStream::LowPriority, low);

        let high = collect_into(
            "high priority tasks",
            self.repository.sort_by_high_priority(),
            self.high_priority_tasks.clone(),
            self.high_priority_tasks.restart(),
        );
        self.subscriptions.replace(ListStream::HighPriority, high);
    }

    // ===== Writes =====

    /// Stores the sort order in the background. A failure is logged and
    /// otherwise ignored.
    pub fn persist_sort_state(&self, priority: Priority) -> JoinHandle<()> {
        let sort_preferences = self.sort_preferences.clone();
        tokio::spawn(async move {
            if let Err(e) = sort_preferences.persist_sort_state(priority).await {
                tracing::warn!("LIST: Failed to persist sort state {}: {}", priority, e);
            }
        })
    }

    pub fn delete_all_tasks(&self) -> JoinHandle<TaskResult<()>> {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            let result = repository.delete_all_tasks().await;
            if let Err(e) = &result {
                tracing::error!("LIST: Failed to delete all tasks: {}", e);
            }
            result
        })
    }

    pub fn delete_task(&self, task: Task) -> JoinHandle<TaskResult<()>> {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            let result = repository.delete_task(&task).await;
            if let Err(e) = &result {
                tracing::error!("LIST: Failed to delete task {}: {}", task.id, e);
            }
            result
        })
    }

    // ===== Setters =====

    pub fn set_search_bar_state(&self, state: SearchBarState) {
        self.search_bar.send_replace(state);
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.search_text.send_replace(text.into());
    }

    /// Stops every running query. They can be restarted with the load calls.
    pub fn cancel_all(&self) {
        self.subscriptions.cancel_all();
    }

    // ===== Snapshots =====

    pub fn search_bar_state(&self) -> SearchBarState {
        *self.search_bar.borrow()
    }

    pub fn search_text(&self) -> String {
        self.search_text.borrow().clone()
    }

    pub fn all_tasks(&self) -> QueryState<Vec<Task>> {
        self.all_tasks.get()
    }

    pub fn searched_tasks(&self) -> QueryState<Vec<Task>> {
        self.searched_tasks.get()
    }

    /// `Loading` until the first sorted result arrives.
    pub fn low_priority_tasks(&self) -> QueryState<Vec<Task>> {
        self.low_priority_tasks.get()
    }

    pub fn high_priority_tasks(&self) -> QueryState<Vec<Task>> {
        self.high_priority_tasks.get()
    }

    pub fn sort_state(&self) -> QueryState<Priority> {
        self.sort_state.get()
    }

    /// Which list the screen should show right now.
    pub fn list_view(&self) -> ListView {
        let sort = self.sort_state.get().success().copied();
        ListView::resolve(self.search_bar_state(), sort)
    }

    /// The tasks for [`list_view`](Self::list_view).
    pub fn visible_tasks(&self) -> QueryState<Vec<Task>> {
        match self.list_view() {
            ListView::All => self.all_tasks(),
            ListView::Search => self.searched_tasks(),
            ListView::LowFirst => self.low_priority_tasks(),
            ListView::HighFirst => self.high_priority_tasks(),
        }
    }

    // ===== Observers =====

    pub fn watch_search_bar_state(&self) -> watch::Receiver<SearchBarState> {
        self.search_bar.subscribe()
    }

    pub fn watch_search_text(&self) -> watch::Receiver<String> {
        self.search_text.subscribe()
    }

    pub fn watch_all_tasks(&self) -> watch::Receiver<QueryState<Vec<Task>>> {
        self.all_tasks.subscribe()
    }

    pub fn watch_searched_tasks(&self) -> watch::Receiver<QueryState<Vec<Task>>> {
        self.searched_tasks.subscribe()
    }

    pub fn watch_low_priority_tasks(&self) -> watch::Receiver<QueryState<Vec<Task>>> {
        self.low_priority_tasks.subscribe()
    }

    pub fn watch_high_priority_tasks(&self) -> watch::Receiver<QueryState<Vec<Task>>> {
        self.high_priority_tasks.subscribe()
    }

    pub fn watch_sort_state(&self) -> watch::Receiver<QueryState<Priority>> {
        self.sort_state.subscribe()
    }

    /// Number of queries still running.
    pub fn active_queries(&self) -> usize {
        self.subscriptions.active_count()
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        tracing::debug!("LIST: Controller dropped, cancelling queries");
    }
}
