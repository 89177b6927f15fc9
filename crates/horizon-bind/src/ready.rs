//! One-shot readiness signal.
//!
//! Scope scans of attached components wait for the host to declare the
//! document ready. Work queued before that runs in the order it was queued;
//! work queued afterwards runs immediately.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use horizon_bind_core::Result;

use crate::logging::targets;

type ReadyTask = Box<dyn FnOnce() -> Result<()> + Send>;

enum ReadyState {
    Pending(VecDeque<ReadyTask>),
    Fired,
}

/// A signal that fires exactly once.
pub struct ReadySignal {
    state: Mutex<ReadyState>,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadySignal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReadyState::Pending(VecDeque::new())),
        }
    }

    /// Whether the signal has fired.
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), ReadyState::Fired)
    }

    /// Number of tasks waiting for the signal.
    pub fn pending(&self) -> usize {
        match &*self.state.lock() {
            ReadyState::Pending(queue) => queue.len(),
            ReadyState::Fired => 0,
        }
    }

    /// Run `task` once the signal has fired.
    ///
    /// Runs it now, returning its result, when the signal already fired.
    pub fn when_ready<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        {
            let mut state = self.state.lock();
            if let ReadyState::Pending(queue) = &mut *state {
                queue.push_back(Box::new(task));
                tracing::trace!(target: targets::READY, pending = queue.len(), "task deferred until ready");
                return Ok(());
            }
        }
        task()
    }

    /// Fire the signal, running every queued task in order.
    ///
    /// Every task runs even if an earlier one fails; the first error is
    /// returned. Firing again is a no-op.
    pub fn fire(&self) -> Result<()> {
        let queue = match std::mem::replace(&mut *self.state.lock(), ReadyState::Fired) {
            ReadyState::Pending(queue) => queue,
            ReadyState::Fired => return Ok(()),
        };
        tracing::debug!(target: targets::READY, tasks = queue.len(), "ready");

        let mut first_error = None;
        for task in queue {
            if let Err(err) = task() {
                tracing::warn!(target: targets::READY, %err, "deferred task failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySignal")
            .field("ready", &self.is_ready())
            .field("pending", &self.pending())
            .finish()
    }
}
