use crate::types::{ExecStatus, ExecutionResult};

/// Error reported by a guest-operations backend.
///
/// Backends classify their failures into these buckets; the launcher and
/// poller decide what each bucket means for the operation as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("authentication rejected: {0}")]
    Unauthenticated(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("remote fault: {0}")]
    Fault(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GuestExecError {
    #[error("guest authentication failed: {0}")]
    Authentication(String),

    #[error("launch failed: {0}")]
    Launch(String),

    #[error("poll failed: {0}")]
    Poll(String),

    #[error("vm not found: {0}")]
    NotFound(String),

    #[error("invalid process spec: {0}")]
    InvalidSpec(String),

    #[error("vm lookup failed: {0}")]
    Lookup(#[from] RemoteError),
}

impl GuestExecError {
    /// The `LaunchFailed` result for errors raised before any process was
    /// spawned in the guest. `None` for every other error.
    pub fn launch_failure(&self) -> Option<ExecutionResult> {
        match self {
            Self::Authentication(_) | Self::Launch(_) => Some(ExecutionResult {
                status: ExecStatus::LaunchFailed,
                raw_exit_code: None,
            }),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GuestExecError>;
