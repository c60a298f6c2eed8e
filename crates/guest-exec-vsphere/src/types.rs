//! Wire types for the vSphere Automation REST API.

use chrono::{DateTime, Utc};
use guest_exec::{GuestCredential, GuestProcessInfo, ProcessSpec};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub interactive_session: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub user_name: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a GuestCredential> for Credentials<'a> {
    fn from(credential: &'a GuestCredential) -> Self {
        Self {
            interactive_session: false,
            kind: "USERNAME_PASSWORD",
            user_name: credential.username(),
            password: credential.password(),
        }
    }
}

/// Body of the `get` and `list` process actions.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub credentials: Credentials<'a>,
}

impl<'a> From<&'a GuestCredential> for CredentialsRequest<'a> {
    fn from(credential: &'a GuestCredential) -> Self {
        Self {
            credentials: credential.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgramSpec<'a> {
    pub path: &'a str,
    pub arguments: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<&'a str>,
}

impl<'a> From<&'a ProcessSpec> for ProgramSpec<'a> {
    fn from(spec: &'a ProcessSpec) -> Self {
        Self {
            path: spec.program_path(),
            arguments: spec.arguments(),
            working_directory: spec.working_directory(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateProcessRequest<'a> {
    pub credentials: Credentials<'a>,
    pub spec: ProgramSpec<'a>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct VmSummary {
    pub vm: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ToolsInfo {
    pub run_state: String,
    #[serde(default)]
    pub version_status: Option<String>,
}

/// Answer of `guest/processes?action=list`. Carries no exit code.
#[derive(Debug, Deserialize)]
pub struct ProcessSummary {
    pub pid: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
}

impl From<ProcessSummary> for GuestProcessInfo {
    fn from(s: ProcessSummary) -> Self {
        Self {
            pid: s.pid,
            name: s.name,
            command: s.command,
            started: s.started,
            exit_code: None,
        }
    }
}

/// Answer of `guest/processes/{pid}?action=get`.
#[derive(Debug, Deserialize)]
pub struct ProcessInfo {
    #[serde(default)]
    pub pid: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exit_code: Option<i64>,
}

impl ProcessInfo {
    pub fn into_guest_info(self, requested_pid: i64) -> GuestProcessInfo {
        GuestProcessInfo {
            pid: self.pid.unwrap_or(requested_pid),
            name: self.name,
            command: self.command,
            started: self.started,
            exit_code: self.exit_code,
        }
    }
}

/// vAPI error body.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub default_message: String,
}
