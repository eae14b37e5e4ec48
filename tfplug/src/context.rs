//! Context implementation for request-scoped data and cancellation
//!
//! Every RPC handed to a provider, resource or data source carries a
//! [`Context`]. It names the operation for logging and observes the stop
//! signal raised by Terraform's StopProvider call.

use crate::error::{Result, TfplugError};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Context carries request-scoped values like cancellation signals, timeouts, and metadata
/// Pass this as first parameter to provider trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    rpc: &'static str,
    type_name: Option<String>,
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
}

/// Raises the stop signal shared by every context derived from it.
#[derive(Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates a context for one RPC.
    pub fn context(&self, rpc: &'static str) -> Context {
        Context {
            inner: Arc::new(ContextInner {
                rpc,
                type_name: None,
                deadline: None,
                done: self.tx.subscribe(),
            }),
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        StopSignal::new().context("none")
    }

    pub fn with_type_name(self, type_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                rpc: self.inner.rpc,
                type_name: Some(type_name.into()),
                deadline: self.inner.deadline,
                done: self.inner.done.clone(),
            }),
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                rpc: self.inner.rpc,
                type_name: self.inner.type_name.clone(),
                deadline: Some(Instant::now() + timeout),
                done: self.inner.done.clone(),
            }),
        }
    }

    pub fn rpc(&self) -> &'static str {
        self.inner.rpc
    }

    pub fn type_name(&self) -> Option<&str> {
        self.inner.type_name.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
            || self
                .inner
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves once the stop signal is raised or the deadline passes.
    pub async fn cancelled(&self) {
        let mut done = self.inner.done.clone();
        let stopped = async {
            // A dropped sender can no longer stop us.
            let closed = done.wait_for(|stopped| *stopped).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        };
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = stopped => {}
                    _ = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => stopped.await,
        }
    }

    /// Runs `fut` unless the context is cancelled first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        if self.is_cancelled() {
            return Err(TfplugError::Cancelled);
        }
        tokio::select! {
            out = fut => Ok(out),
            _ = self.cancelled() => Err(TfplugError::Cancelled),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn context_carries_operation_names() {
        let ctx = StopSignal::new()
            .context("ReadResource")
            .with_type_name("sonarr_root_folder");

        assert_eq!(ctx.rpc(), "ReadResource");
        assert_eq!(ctx.type_name(), Some("sonarr_root_folder"));
    }

    #[tokio::test]
    async fn context_timeout_cancels() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));

        assert!(!ctx.is_cancelled());
        sleep(Duration::from_millis(80)).await;
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn stop_signal_cancels_running_work() {
        let signal = StopSignal::new();
        let ctx = signal.context("ApplyResourceChange");

        let stopper = signal.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            stopper.stop();
        });

        let result = ctx.run(sleep(Duration::from_secs(5))).await;

        assert!(matches!(result, Err(TfplugError::Cancelled)));
        assert!(signal.is_stopped());
    }

    #[tokio::test]
    async fn run_returns_output_when_not_cancelled() {
        let ctx = Context::new();
        let value = ctx.run(async { 42 }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn cancelled_future_wakes_on_stop() {
        let signal = StopSignal::new();
        let ctx = signal.context("PlanResourceChange");
        let mut cancelled = tokio_test::task::spawn(ctx.cancelled());

        tokio_test::assert_pending!(cancelled.poll());
        signal.stop();
        assert!(cancelled.is_woken());
        tokio_test::assert_ready!(cancelled.poll());
    }

    #[tokio::test]
    async fn stop_cancels_every_derived_context() {
        let signal = StopSignal::new();
        let runs = (0..4).map(|_| {
            let ctx = signal.context("ReadResource");
            async move { ctx.run(sleep(Duration::from_secs(5))).await }
        });

        let stopper = signal.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            stopper.stop();
        });

        let results = futures::future::join_all(runs).await;
        assert!(results
            .iter()
            .all(|result| matches!(result, Err(TfplugError::Cancelled))));
    }

    #[tokio::test]
    async fn contexts_created_after_stop_are_cancelled() {
        let signal = StopSignal::new();
        signal.stop();

        let ctx = signal.context("ReadDataSource");
        assert!(ctx.is_cancelled());
        assert!(matches!(
            ctx.run(async {}).await,
            Err(TfplugError::Cancelled)
        ));
    }
}
