use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tasklist_core::{ClientError, Resource};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::live::LiveQuery;

/// Query envelope held by the controllers. Errors are shared so the state
/// can be cloned out to observers.
pub type QueryState<T> = Resource<T, Arc<ClientError>>;

/// Shared, observable state cell written from background collectors.
pub type StateCell<T> = Arc<watch::Sender<T>>;

pub(crate) fn state_cell<T>(initial: T) -> StateCell<T> {
    let (tx, _) = watch::channel(initial);
    Arc::new(tx)
}

/// Observable query state fed by one run at a time.
///
/// Every [`restart`](Self::restart) starts a new run. Writes from earlier
/// runs are dropped, even when their collector is still finishing after
/// being aborted.
pub(crate) struct QueryCell<T> {
    state: StateCell<QueryState<T>>,
    generation: Arc<AtomicU64>,
}

impl<T> Clone for QueryCell<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<T> QueryCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: state_cell(Resource::Idle),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Moves to `Loading` and returns the id of the new run.
    pub(crate) fn restart(&self) -> u64 {
        let mut run = 0;
        // bumped under the watch lock so no older run can write in between
        self.state.send_modify(|state| {
            run = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            *state = Resource::Loading;
        });
        run
    }

    /// Stores the state built by `make` if `run` is still the latest.
    /// Returns whether it was stored.
    pub(crate) fn publish_with<F>(&self, run: u64, make: F) -> bool
    where
        F: FnOnce() -> QueryState<T>,
    {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::Acquire) != run {
                return false;
            }
            *state = make();
            true
        })
    }

    pub(crate) fn publish(&self, run: u64, value: QueryState<T>) -> bool {
        self.publish_with(run, || value)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }
}

impl<T: Clone> QueryCell<T> {
    pub(crate) fn get(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }
}

/// Spawns a collector for run `run` of `target`: every emission of `stream`
/// is stored as `Success`, the first failure as `Error`. The collector stops
/// once a newer run has started.
pub(crate) fn collect_into<T>(
    label: &'static str,
    mut stream: LiveQuery<T>,
    target: QueryCell<T>,
    run: u64,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(value) => {
                    if !target.publish(run, Resource::Success(value)) {
                        tracing::debug!("STATE: {} run {} superseded", label, run);
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("STATE: {} failed: {}", label, e);
                    target.publish(run, Resource::Error(Arc::new(e)));
                    break;
                }
            }
        }
        tracing::debug!("STATE: {} collector finished", label);
    })
}
