use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{GuestExecError, Result};

/// Exit code reported by the CLI when the outcome is unknown or timed out.
pub const EXIT_UNKNOWN: u8 = 3;
/// Exit code reported by the CLI for fatal errors.
pub const EXIT_FAILURE: u8 = 1;

/// Username/password pair for the guest OS.
///
/// `Debug` never prints the password.
#[derive(Clone)]
pub struct GuestCredential {
    username: String,
    password: String,
}

impl GuestCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for GuestCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Program to start in the guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    program_path: String,
    arguments: String,
    working_directory: Option<String>,
}

impl ProcessSpec {
    /// Fails with [`GuestExecError::InvalidSpec`] if `program_path` is blank.
    /// Path syntax is left to the guest OS.
    pub fn new(
        program_path: impl Into<String>,
        arguments: impl Into<String>,
        working_directory: Option<String>,
    ) -> Result<Self> {
        let program_path = program_path.into();
        if program_path.trim().is_empty() {
            return Err(GuestExecError::InvalidSpec(
                "program path must not be empty".into(),
            ));
        }
        Ok(Self {
            program_path,
            arguments: arguments.into(),
            working_directory: working_directory.filter(|d| !d.is_empty()),
        })
    }

    pub fn program_path(&self) -> &str {
        &self.program_path
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }
}

/// A VM resolved by exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRef {
    /// Backend object id (e.g. `vm-42`).
    pub id: String,
    pub name: String,
}

/// Guest tools/agent state read from the VM's runtime info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsStatus {
    pub running: bool,
    pub run_state: String,
    pub version_status: Option<String>,
}

/// One entry of a guest process listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestProcessInfo {
    pub pid: i64,
    pub name: Option<String>,
    pub command: Option<String>,
    pub started: Option<DateTime<Utc>>,
    /// Present once the process has exited.
    pub exit_code: Option<i64>,
}

impl GuestProcessInfo {
    pub fn state(&self) -> ProcessState {
        match self.exit_code {
            Some(code) => ProcessState::Exited(code),
            None => ProcessState::Running,
        }
    }
}

/// Handle to a process started by [`launch`](crate::launch).
///
/// Consumed by [`await_completion`](crate::await_completion), so a handle
/// backs at most one polling run.
#[derive(Debug)]
pub struct ProcessHandle {
    /// `None` when the start call returned no identifier.
    pub pid: Option<i64>,
    pub program_path: String,
    pub launched_at: DateTime<Utc>,
}

/// State observed by a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited(i64),
    /// The guest reported no matching process.
    Vanished,
}

/// Terminal state of a polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalState {
    Exited(i64),
    Vanished,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub final_state: FinalState,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// Guest exit code masked to a byte.
    Completed(u8),
    UnknownExit,
    TimedOut,
    LaunchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecStatus,
    /// Unmasked guest exit code, kept for diagnostics.
    pub raw_exit_code: Option<i64>,
}

impl ExecutionResult {
    /// Process exit code for the local caller.
    pub fn exit_code(&self) -> u8 {
        match self.status {
            ExecStatus::Completed(code) => code,
            ExecStatus::UnknownExit | ExecStatus::TimedOut => EXIT_UNKNOWN,
            ExecStatus::LaunchFailed => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_redacts_password() {
        let cred = GuestCredential::new("Administrator", "WinPass123");
        let debug = format!("{cred:?}");
        assert!(debug.contains("Administrator"));
        assert!(!debug.contains("WinPass123"), "debug was: {debug}");
    }

    #[test]
    fn spec_rejects_blank_program_path() {
        for path in ["", "   "] {
            let err = ProcessSpec::new(path, "", None).unwrap_err();
            assert!(matches!(err, GuestExecError::InvalidSpec(_)), "{err}");
        }
    }

    #[test]
    fn spec_keeps_arguments_verbatim() {
        let spec = ProcessSpec::new(
            r"C:\Windows\System32\cmd.exe",
            "/c echo Hello",
            Some(r"C:\Temp".into()),
        )
        .unwrap();
        assert_eq!(spec.program_path(), r"C:\Windows\System32\cmd.exe");
        assert_eq!(spec.arguments(), "/c echo Hello");
        assert_eq!(spec.working_directory(), Some(r"C:\Temp"));
    }

    #[test]
    fn spec_drops_empty_working_directory() {
        let spec = ProcessSpec::new("/bin/sh", "", Some(String::new())).unwrap();
        assert_eq!(spec.working_directory(), None);
    }

    #[test]
    fn process_info_state_follows_exit_code() {
        let mut info = GuestProcessInfo {
            pid: 7,
            name: None,
            command: None,
            started: None,
            exit_code: None,
        };
        assert_eq!(info.state(), ProcessState::Running);
        info.exit_code = Some(2);
        assert_eq!(info.state(), ProcessState::Exited(2));
    }

    #[test]
    fn exit_code_per_status() {
        let result = |status| ExecutionResult {
            status,
            raw_exit_code: None,
        };
        assert_eq!(result(ExecStatus::Completed(0)).exit_code(), 0);
        assert_eq!(result(ExecStatus::Completed(42)).exit_code(), 42);
        assert_eq!(result(ExecStatus::UnknownExit).exit_code(), 3);
        assert_eq!(result(ExecStatus::TimedOut).exit_code(), 3);
        assert_eq!(result(ExecStatus::LaunchFailed).exit_code(), 1);
    }
}
