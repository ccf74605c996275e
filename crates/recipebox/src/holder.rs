//! State holders that fold repository streams into view state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

use recipebox_core::resource::{Resource, ResourceStream};

/// Immutable snapshot of one screen's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState<T> {
    pub loading: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            data: None,
            error: None,
        }
    }
}

impl<T: Clone> ViewState<T> {
    /// Returns the state after applying one envelope.
    ///
    /// Data survives `Loading` and `Failure` so a screen keeps showing what
    /// it had while refreshing or after a failed refresh.
    pub fn apply(&self, item: Resource<T>) -> Self {
        match item {
            Resource::Loading => Self {
                loading: true,
                data: self.data.clone(),
                error: None,
            },
            Resource::Success(value) => Self {
                loading: false,
                data: Some(value),
                error: None,
            },
            Resource::Failure(message) => Self {
                loading: false,
                data: self.data.clone(),
                error: Some(message),
            },
        }
    }
}

/// Holds the latest [`ViewState`] of a bound repository stream.
///
/// Binding a new stream cancels the previous one. Dropping the holder
/// cancels the current one. Cancelling abandons the in-flight remote call
/// but does not undo writes already issued.
pub struct StateHolder<T> {
    state: watch::Sender<ViewState<T>>,
    task: Mutex<Option<JoinHandle<()>>>,
    /// Generation of the most recent binding.
    bound: AtomicU64,
    /// Highest generation whose stream ran to completion.
    finished: watch::Sender<u64>,
}

impl<T> StateHolder<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(ViewState::default());
        let (finished, _) = watch::channel(0);
        Self {
            state,
            task: Mutex::new(None),
            bound: AtomicU64::new(0),
            finished,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> ViewState<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }

    /// Starts folding `stream` into the state, cancelling any previous binding.
    pub fn bind(&self, mut stream: ResourceStream<T>) {
        let generation = self.bound.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.state.clone();
        let finished = self.finished.clone();
        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                state.send_modify(|current| *current = current.apply(item));
            }
            finished.send_modify(|done| *done = (*done).max(generation));
        });

        let previous = match self.task.lock() {
            Ok(mut slot) => slot.replace(task),
            Err(poisoned) => poisoned.into_inner().replace(task),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Waits until the most recently bound stream has ended and returns the
    /// final state.
    ///
    /// A cached value followed by a still-running remote read does not count
    /// as settled. If a newer stream is bound while waiting, waits for that
    /// one instead. Returns immediately when nothing was ever bound.
    pub async fn settled(&self) -> ViewState<T> {
        let generation = self.bound.load(Ordering::SeqCst);
        let mut rx = self.finished.subscribe();
        if rx.wait_for(|done| *done >= generation).await.is_err() {
            tracing::debug!(generation, "State holder closed before its stream ended");
        }
        self.state()
    }
}

impl<T> Default for StateHolder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for StateHolder<T> {
    fn drop(&mut self) {
        let task = match self.task.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            task.abort();
        }
    }
}
