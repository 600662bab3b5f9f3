//! Per-call cancellation and deadlines.
//!
//! Every backend and sink operation takes a [`CallContext`]. The context pairs
//! a [`CancellationToken`] with an optional deadline; [`CallContext::guard`]
//! races a future against both and turns whichever fires first into an error of
//! the caller's choosing (via `From<Interruption>`).
//!
//! Child contexts share the parent's token hierarchy, so cancelling a parent
//! stops every call made under it.

use std::{future::Future, time::Duration};

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::error::Interruption;

/// Cancellation token plus optional deadline for a single call (or a group of
/// calls sharing the same budget).
///
/// Cloning is cheap; clones observe the same token and deadline.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use zinc_store::CallContext;
///
/// let ctx = CallContext::new().with_timeout(Duration::from_millis(250));
/// assert!(ctx.interruption().is_none());
///
/// ctx.cancel();
/// assert!(ctx.interruption().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Creates a context that is never cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context driven by an existing token.
    #[must_use]
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token, deadline: None }
    }

    /// Returns a copy of this context whose deadline is `timeout` from now.
    ///
    /// An existing, earlier deadline is kept.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a copy of this context with the given deadline.
    ///
    /// An existing, earlier deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Creates a child context: cancelling `self` cancels the child, but not
    /// the other way around. The deadline is inherited.
    #[must_use]
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token(), deadline: self.deadline }
    }

    /// Cancels this context (and every child).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the underlying token.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why this context is already done, or `None` if calls may
    /// still proceed.
    #[must_use]
    pub fn interruption(&self) -> Option<Interruption> {
        if self.token.is_cancelled() {
            return Some(Interruption::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(Interruption::DeadlineExceeded),
            _ => None,
        }
    }

    /// Runs `fut` under this context.
    ///
    /// If the context is already done, `fut` is never polled. Otherwise the
    /// first of (cancellation, deadline, completion) wins; cancellation takes
    /// precedence when several are ready at once.
    ///
    /// # Errors
    ///
    /// Returns `fut`'s own error, or `E::from(Interruption)` when the context
    /// stops the call.
    pub async fn guard<F, T, E>(&self, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Interruption>,
    {
        if let Some(reason) = self.interruption() {
            return Err(reason.into());
        }

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(Interruption::Cancelled.into()),
            () = wait_for(self.deadline) => Err(Interruption::DeadlineExceeded.into()),
            result = fut => result,
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
