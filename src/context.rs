//! Per-call deadline and cancellation.
//!
//! Every client call and every server-side invocation carries a `CallContext`.
//! It is checked before I/O starts and raced against the I/O while it runs.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::status::Status;

/// Deadline and cancellation signal passed alongside every call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    token: CancellationToken,
    request_id: Option<String>,
}

impl CallContext {
    /// A context with no deadline and a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline to `now + timeout`, keeping an earlier existing deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    /// Set an absolute deadline, keeping an earlier existing deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// A derived context: same deadline, cancelled when this one is.
    pub fn child(&self) -> Self {
        Self {
            deadline: self.deadline,
            token: self.token.child_token(),
            request_id: self.request_id.clone(),
        }
    }

    /// Fail fast if the call is already cancelled or past its deadline.
    pub fn check(&self) -> Result<(), Status> {
        if self.is_cancelled() {
            return Err(Status::cancelled("call cancelled"));
        }
        if self.is_expired() {
            return Err(Status::deadline_exceeded("deadline exceeded"));
        }
        Ok(())
    }

    /// Resolves once the call is cancelled or its deadline elapses.
    pub async fn done(&self) -> Status {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => Status::cancelled("call cancelled"),
                _ = tokio::time::sleep_until(deadline) => Status::deadline_exceeded("deadline exceeded"),
            },
            None => {
                self.token.cancelled().await;
                Status::cancelled("call cancelled")
            }
        }
    }

    /// Run `future` until it completes or the context ends, whichever is first.
    ///
    /// The future is dropped (aborting it) when the context ends first.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, Status> {
        self.check()?;
        tokio::select! {
            output = future => Ok(output),
            status = self.done() => Err(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::OutcomeCode;

    #[tokio::test]
    async fn test_expired_deadline_fails_check() {
        let ctx = CallContext::new().with_timeout(Duration::ZERO);
        assert!(ctx.is_expired());
        assert_eq!(ctx.check().unwrap_err().code(), OutcomeCode::DeadlineExceeded);
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_earlier_deadline_wins() {
        let ctx = CallContext::new()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
        let result = ctx
            .run(tokio::time::sleep(Duration::from_secs(10)))
            .await;
        assert_eq!(result.unwrap_err().code(), OutcomeCode::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_cancel_propagates_to_child() {
        let parent = CallContext::new();
        let child = parent.child();
        parent.cancel();
        assert!(child.is_cancelled());
        assert_eq!(child.done().await.code(), OutcomeCode::Cancelled);
        assert_eq!(child.check().unwrap_err().code(), OutcomeCode::Cancelled);
    }

    #[tokio::test]
    async fn test_run_completes() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.run(async { 7 }).await.unwrap(), 7);
    }
}
