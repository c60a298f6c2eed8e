use guest_exec::{GuestExecError, RemoteError};

#[derive(Debug, thiserror::Error)]
pub enum VexecError {
    #[error("config error: {0}")]
    Config(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error(transparent)]
    Exec(#[from] GuestExecError),

    #[error("vsphere error: {0}")]
    Remote(#[from] RemoteError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VexecResult<T> = Result<T, VexecError>;
