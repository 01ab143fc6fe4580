//! Deadline propagation for chain queries.
//!
//! One [`CallContext`] is created per engine operation and passed to every
//! gateway call made on its behalf, so the total time spent on a route is
//! bounded no matter how many reads and writes it needs.

use std::time::{Duration, Instant};

use crate::error::GatewayError;

/// Deadline shared by all chain calls of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    deadline: Instant,
}

impl CallContext {
    /// Context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Fail fast if the deadline has passed.
    ///
    /// # Errors
    ///
    /// [`GatewayError::DeadlineExceeded`] naming `operation`.
    pub fn check(&self, operation: &str) -> Result<(), GatewayError> {
        if self.is_expired() {
            return Err(GatewayError::DeadlineExceeded {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_has_time_left() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        assert!(!ctx.is_expired());
        assert!(ctx.remaining() > Duration::from_secs(4));
        assert!(ctx.check("adapters").is_ok());
    }

    #[test]
    fn expired_context_fails_check() {
        let ctx = CallContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_expired());
        assert_eq!(ctx.remaining(), Duration::ZERO);
        assert_eq!(
            ctx.check("defaultBridgeTypes"),
            Err(GatewayError::DeadlineExceeded {
                operation: "defaultBridgeTypes".into()
            })
        );
    }
}
