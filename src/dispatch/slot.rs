//! Request tokens and query slots
//!
//! A slot hands out monotonically increasing tokens. Only the newest token
//! is current; issuing a new one aborts the task of the previous request.
//! Results must be checked against [`QuerySlot::is_current`] before they are
//! applied.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::task::AbortHandle;

use crate::error::ApiError;
use crate::log_debug;

const MODULE: &str = "dispatch";

/// Marker of one dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// One logical query slot (e.g. the filtered file list)
#[derive(Debug)]
pub struct QuerySlot {
    name: &'static str,
    generation: AtomicU64,
    in_flight: Mutex<Option<(RequestToken, AbortHandle)>>,
}

impl QuerySlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Invalidate the current token and abort its request
    pub fn issue(&self) -> RequestToken {
        let token = RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        if let Some((old, handle)) = self.take_in_flight() {
            log_debug!(
                MODULE,
                "[{}] request #{} superseded by #{}",
                self.name,
                old.0,
                token.0
            );
            handle.abort();
        }
        token
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Invalidate every outstanding token without issuing a new request.
    ///
    /// Returns true if a request was in flight.
    pub fn cancel(&self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        match self.take_in_flight() {
            Some((token, handle)) => {
                log_debug!(MODULE, "[{}] request #{} cancelled", self.name, token.0);
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Remember the task serving `token` so a newer request can abort it
    pub fn attach(&self, token: RequestToken, handle: AbortHandle) {
        let mut guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if self.is_current(token) {
            *guard = Some((token, handle));
        } else {
            handle.abort();
        }
    }

    /// Forget the task of a completed request
    pub fn finish(&self, token: RequestToken) {
        let mut guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(guard.as_ref(), Some((current, _)) if *current == token) {
            *guard = None;
        }
    }

    /// Run `request` as its own task bound to `token`.
    ///
    /// Resolves to [`ApiError::Cancelled`] if the task is aborted by a newer
    /// request or by [`cancel`](Self::cancel).
    pub async fn run<T, F>(&self, token: RequestToken, request: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let task = tokio::spawn(request);
        self.attach(token, task.abort_handle());
        let result = task.await.map_err(ApiError::from_join).and_then(|r| r);
        self.finish(token);
        result
    }

    fn take_in_flight(&self) -> Option<(RequestToken, AbortHandle)> {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

impl Drop for QuerySlot {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.take_in_flight() {
            handle.abort();
        }
    }
}
