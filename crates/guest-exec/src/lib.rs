//! Run a single program inside a VM guest and wait for its exit status.
//!
//! The hypervisor is reached through the [`GuestOperations`] trait; this crate
//! owns the orchestration on top of it:
//!
//! 1. [`launch`] starts the program and returns a [`ProcessHandle`]
//! 2. [`await_completion`] polls the guest until the process exits, vanishes,
//!    or the deadline passes (plus one grace query)
//! 3. [`translate`] turns the [`PollOutcome`] into an [`ExecutionResult`]
//!
//! [`execute`] runs the whole sequence for a VM looked up by name.

mod config;
mod error;
mod execute;
mod launcher;
mod ops;
mod poller;
mod translate;
mod types;

#[cfg(test)]
mod testing;

pub use config::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, ExecOptions, PollPolicy};
pub use error::{GuestExecError, RemoteError, Result};
pub use execute::execute;
pub use launcher::launch;
pub use ops::GuestOperations;
pub use poller::await_completion;
pub use translate::translate;
pub use types::{
    EXIT_FAILURE, EXIT_UNKNOWN, ExecStatus, ExecutionResult, FinalState, GuestCredential,
    GuestProcessInfo, PollOutcome, ProcessHandle, ProcessSpec, ProcessState, ToolsStatus, VmRef,
};
