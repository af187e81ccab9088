//! Run-wide cancellation.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::CoreError;

type AbortListener = Box<dyn Fn() + Send + Sync>;

/// Cancels a run on its first failure.
///
/// Only the first reason is kept. Listeners run once, on the thread that
/// aborts.
#[derive(Default)]
pub struct AbortController {
    aborted: AtomicBool,
    reason: Mutex<Option<CoreError>>,
    listeners: Mutex<Vec<AbortListener>>,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener run when the controller aborts.
    pub fn on_abort(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.lock().push(Box::new(listener));
    }

    /// Aborts with `reason`. Returns false, dropping `reason`, if the
    /// controller was already aborted.
    pub fn abort(&self, reason: CoreError) -> bool {
        if self.aborted.swap(true, Ordering::SeqCst) {
            return false;
        }
        *self.reason.lock() = Some(reason);
        for listener in self.listeners.lock().iter() {
            listener();
        }
        true
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Takes the error the controller was aborted with.
    pub fn take_reason(&self) -> Option<CoreError> {
        self.reason.lock().take()
    }
}

impl std::fmt::Debug for AbortController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbortController")
            .field("aborted", &self.is_aborted())
            .finish_non_exhaustive()
    }
}
