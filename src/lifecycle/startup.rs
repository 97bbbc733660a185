//! Platform lifecycle signals.
//!
//! # Responsibilities
//! - Provide one-shot "engine started / stopping / stopped" events
//! - Let components register continuations that run once an event fired
//!
//! # Design Decisions
//! - A signal is a latch: it fires at most once and stays fired
//! - Continuations registered after the signal fired run immediately
//! - Backed by `tokio::sync::watch`, so waiters never miss the transition

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A one-shot event that any number of tasks can wait on.
#[derive(Debug, Clone)]
pub struct LifecycleSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl LifecycleSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Returns `true` only for the call that fired it.
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal has fired.
    pub async fn fired(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    /// Run `continuation` on the current runtime once the signal fires.
    ///
    /// Must be called from within a tokio runtime.
    pub fn register<F>(&self, continuation: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let signal = self.clone();
        tokio::spawn(async move {
            signal.fired().await;
            continuation.await
        })
    }
}

impl Default for LifecycleSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle events of the owning service engine.
///
/// The engine fires `started` once its own initialization (including entry
/// registration) has finished. Cloning shares the same signals.
#[derive(Debug, Clone, Default)]
pub struct EngineLifetime {
    started: LifecycleSignal,
    stopping: LifecycleSignal,
    stopped: LifecycleSignal,
}

impl EngineLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> &LifecycleSignal {
        &self.started
    }

    pub fn stopping(&self) -> &LifecycleSignal {
        &self.stopping
    }

    pub fn stopped(&self) -> &LifecycleSignal {
        &self.stopped
    }

    /// Signal that the engine finished starting.
    pub fn notify_started(&self) {
        if self.started.fire() {
            tracing::info!("Service engine started");
        }
    }

    /// Request an orderly shutdown.
    pub fn stop_application(&self) {
        if self.stopping.fire() {
            tracing::info!("Service engine stopping");
        }
    }

    /// Signal that shutdown completed.
    pub fn notify_stopped(&self) {
        if self.stopped.fire() {
            tracing::info!("Service engine stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fires_only_once() {
        let signal = LifecycleSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    #[tokio::test]
    async fn continuation_waits_for_signal() {
        let signal = LifecycleSignal::new();
        let handle = signal.register(async { 42 });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        signal.fire();
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn late_registration_runs_immediately() {
        let signal = LifecycleSignal::new();
        signal.fire();

        let value = tokio::time::timeout(Duration::from_secs(1), signal.register(async { "ran" }))
            .await
            .expect("continuation should not wait")
            .unwrap();
        assert_eq!(value, "ran");
    }

    #[tokio::test]
    async fn lifetime_clones_share_signals() {
        let lifetime = EngineLifetime::new();
        let observer = lifetime.clone();

        lifetime.notify_started();
        assert!(observer.started().is_fired());
        assert!(!observer.stopping().is_fired());
    }
}
