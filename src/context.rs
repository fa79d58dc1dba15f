//! Per-request deadline and cancellation.
//!
//! A [`RequestContext`] travels with a request and, for streaming requests,
//! with the resulting [`crate::stream::StreamReader`]. Every await on the
//! transport is raced against it, so a cancelled or expired context unblocks
//! the caller instead of leaving it waiting on the network.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::ClientError;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl RequestContext {
    /// A context that never expires and is only cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Tie the context to an existing token, e.g. one shared with a UI.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            deadline: None,
            token,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The error the context would currently produce, if it is already done.
    pub fn err(&self) -> Option<ClientError> {
        if self.token.is_cancelled() {
            Some(ClientError::Cancelled)
        } else if self.deadline.is_some_and(|d| d <= Instant::now()) {
            Some(ClientError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ClientError {
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => ClientError::Cancelled,
            _ = expired => ClientError::DeadlineExceeded,
        }
    }

    /// Run `fut` unless the context finishes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = fut => result,
        }
    }
}
