//! Token refresh coordination.
//!
//! When several requests of one [`ApiClient`](crate::ApiClient) hit a `401`
//! at the same time, only the first one runs the refresh; the others queue
//! up and receive the outcome of that single refresh. The queue belongs to
//! the client it was passed to, so independent clients never share a
//! refresh in flight.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::SdkError;

type RefreshFn = Box<dyn Fn() -> BoxFuture<'static, Result<String, SdkError>> + Send + Sync>;
type Waiter = oneshot::Sender<Result<String, String>>;

#[derive(Default)]
struct QueueState {
    refreshing: bool,
    waiters: Vec<Waiter>,
}

/// Serialises token refreshes and fans their outcome out to waiting requests.
pub struct RefreshQueue {
    refresh: RefreshFn,
    state: Mutex<QueueState>,
}

impl RefreshQueue {
    /// Create a queue around `refresh`, which must resolve to a new access
    /// token.
    pub fn new<F, Fut>(refresh: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, SdkError>> + Send + 'static,
    {
        Self {
            refresh: Box::new(move || Box::pin(refresh())),
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of requests waiting on the refresh in flight.
    pub fn pending(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Obtain a fresh access token.
    ///
    /// Runs the refresh function unless one is already running, in which
    /// case this call waits for that refresh to finish.
    pub async fn fresh_token(&self) -> Result<String, SdkError> {
        let waiter = {
            let mut state = self.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("waiting for token refresh in flight");
            return match rx.await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(reason)) => Err(SdkError::Auth(reason)),
                Err(_) => Err(SdkError::Auth("token refresh was abandoned".into())),
            };
        }

        let in_flight = InFlight {
            queue: self,
            settled: false,
        };
        let result = (self.refresh)().await;
        in_flight.settle(result.as_ref().map(String::as_str).map_err(ToString::to_string));
        result
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets the queue when the refreshing future completes or is dropped.
struct InFlight<'a> {
    queue: &'a RefreshQueue,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: Result<&str, String>) {
        let waiters = {
            let mut state = self.queue.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        self.settled = true;

        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "token refresh settled");
        for waiter in waiters {
            let _ = waiter.send(outcome.as_ref().map(|t| t.to_string()).map_err(Clone::clone));
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        // Cancelled mid-refresh: dropping the senders wakes every waiter.
        let mut state = self.queue.lock();
        state.refreshing = false;
        state.waiters.clear();
    }
}
