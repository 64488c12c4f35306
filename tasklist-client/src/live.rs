//! Live queries: streams that re-emit whenever their table changes.

use std::future::Future;

use futures_util::stream::{self, BoxStream};
use tasklist_core::TaskResult;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use crate::events::{StoreEvent, Table};

/// A continuously updated query result.
///
/// Yields the current result first, then a fresh result after every change to
/// the underlying table. A failed read is yielded once as `Err` and ends the
/// stream. Dropping the stream unsubscribes from change notifications.
pub type LiveQuery<T> = BoxStream<'static, TaskResult<T>>;

struct LiveState<F> {
    rx: broadcast::Receiver<StoreEvent>,
    table: Table,
    query: F,
    primed: bool,
    finished: bool,
}

impl<F> LiveState<F> {
    /// Waits until the watched table changes. `false` once the store is gone.
    async fn wait_for_change(&mut self) -> bool {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.table() == self.table => break,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("LIVE: lagged by {} events, re-querying", skipped);
                    break;
                }
                Err(RecvError::Closed) => return false,
            }
        }

        // coalesce a burst of writes into one re-run
        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Closed) => return true,
            }
        }
    }
}

/// Builds a live query over `table`. The subscription is taken before the
/// first read so no change between the read and the subscription is missed.
pub(crate) fn live_query<T, F, Fut>(
    rx: broadcast::Receiver<StoreEvent>,
    table: Table,
    query: F,
) -> LiveQuery<T>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = TaskResult<T>> + Send + 'static,
{
    let state = LiveState {
        rx,
        table,
        query,
        primed: false,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        if state.primed && !state.wait_for_change().await {
            return None;
        }
        state.primed = true;

        let result = (state.query)().await;
        if let Err(e) = &result {
            tracing::warn!("LIVE: query on {:?} failed: {}", state.table, e);
            state.finished = true;
        }
        Some((result, state))
    }))
}
