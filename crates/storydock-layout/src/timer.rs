//! One-shot cancel timers for drag gestures.
//!
//! The timer thread never touches layout state. When it fires it sends a
//! message over a channel; the owning thread drains the channel and decides
//! what the message means.

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Wakes a sleeping timer thread early.
#[derive(Debug, Clone)]
pub(crate) struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a signal and the trigger that sets it.
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Block until stopped or `duration` elapses.
    ///
    /// Returns `true` if stopped.
    pub(crate) fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

#[derive(Debug)]
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        cvar.notify_all();
    }
}

/// A running one-shot timer. Dropping it stops the thread without joining.
#[derive(Debug)]
pub(crate) struct CancelTimer {
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl CancelTimer {
    /// Send `message` on `sender` after `after`, unless stopped first.
    ///
    /// Returns `None` if the thread could not be started.
    pub(crate) fn spawn<M: Send + 'static>(
        after: Duration,
        sender: mpsc::Sender<M>,
        message: M,
    ) -> Option<Self> {
        let (signal, trigger) = StopSignal::new();
        let spawned = thread::Builder::new()
            .name("storydock-drag-timer".into())
            .spawn(move || {
                if !signal.wait_timeout(after) {
                    // Receiver gone means the controller was dropped.
                    let _ = sender.send(message);
                }
            });
        match spawned {
            Ok(handle) => Some(Self {
                trigger,
                thread: Some(handle),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "drag cancel timer could not start");
                None
            }
        }
    }

    /// Stop the timer and wait for its thread to exit.
    pub(crate) fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CancelTimer {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}
