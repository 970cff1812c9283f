//! Cancellable background tasks polled from the UI thread
//!
//! Work is spawned on the tokio runtime and raced against a cancellation
//! token. The UI keeps the returned handle and polls it once per frame with
//! [`TaskHandle::try_take`]; tests simply `wait` on it.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;

use super::error::TaskError;

/// Pending result of a submitted task
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, TaskError>>,
    cancel: CancellationToken,
}

impl<T> TaskHandle<T> {
    /// Request cancellation; the task resolves to `TaskError::Cancelled`
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Take the result if the task has finished
    pub fn try_take(&mut self) -> Option<Result<T, TaskError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(TaskError::Dropped)),
        }
    }

    /// Wait for the task to finish
    pub async fn wait(self) -> Result<T, TaskError> {
        self.rx.await.unwrap_or(Err(TaskError::Dropped))
    }
}

/// Spawns tasks on a tokio runtime
#[derive(Debug, Clone)]
pub struct TaskRunner {
    handle: Handle,
}

impl TaskRunner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawn `work`, handing it the token that cancels it
    pub fn submit<T, F, Fut>(&self, name: &'static str, work: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let (tx, rx) = oneshot::channel();
        let work = work(token.clone());

        self.handle.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(TaskError::Cancelled),
                result = work => result,
            };
            match &result {
                Ok(_) => tracing::debug!("Task {} completed", name),
                Err(e) => tracing::debug!("Task {} ended: {}", name, e),
            }
            // The receiver may already be gone
            let _ = tx.send(result);
        });

        TaskHandle { rx, cancel }
    }
}
