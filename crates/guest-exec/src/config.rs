use std::time::Duration;

use crate::error::{GuestExecError, Result};
use crate::types::{GuestCredential, ProcessSpec};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline and tick interval for the completion poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    timeout: Duration,
    interval: Duration,
}

impl PollPolicy {
    /// A zero interval would spin on the guest agent and is rejected.
    pub fn new(timeout: Duration, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(GuestExecError::InvalidSpec(
                "poll interval must be greater than zero".into(),
            ));
        }
        Ok(Self { timeout, interval })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Everything [`execute`](crate::execute) needs for one invocation.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    pub vm_name: String,
    pub credential: GuestCredential,
    pub spec: ProcessSpec,
    pub policy: PollPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_cli_defaults() {
        let policy = PollPolicy::default();
        assert_eq!(policy.timeout(), Duration::from_secs(60));
        assert_eq!(policy.interval(), Duration::from_secs(1));
    }

    #[test]
    fn zero_interval_rejected() {
        let err = PollPolicy::new(Duration::from_secs(5), Duration::ZERO).unwrap_err();
        assert!(matches!(err, GuestExecError::InvalidSpec(_)));
    }

    #[test]
    fn zero_timeout_allowed() {
        let policy = PollPolicy::new(Duration::ZERO, Duration::from_millis(500)).unwrap();
        assert_eq!(policy.timeout(), Duration::ZERO);
    }

    #[test]
    fn unbounded_timeout_allowed() {
        let policy = PollPolicy::new(Duration::MAX, Duration::from_secs(1)).unwrap();
        assert_eq!(policy.timeout(), Duration::MAX);
        assert_eq!(policy.interval(), Duration::from_secs(1));
    }
}
