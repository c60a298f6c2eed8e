use std::sync::Arc;

use async_trait::async_trait;
use guest_exec::{
    GuestCredential, GuestOperations, GuestProcessInfo, ProcessSpec, RemoteError, ToolsStatus,
    VmRef,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::VsphereConfig;
use crate::error::classify;
use crate::types::{
    CreateProcessRequest, CredentialsRequest, ProcessInfo, ProcessSummary, ToolsInfo, VmSummary,
};

const SESSION_HEADER: &str = "vmware-api-session-id";
const TOOLS_RUNNING: &str = "RUNNING";

/// Authenticated session against the vSphere Automation REST API.
/// Clone is a cheap Arc refcount bump.
#[derive(Clone)]
pub struct VsphereSession {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base_url: String,
    token: String,
}

impl VsphereSession {
    /// Log in with the account credentials of `config` (`POST /api/session`).
    pub async fn connect(config: &VsphereConfig) -> Result<Self, RemoteError> {
        let base_url = config.base_url()?;
        if config.insecure {
            warn!(endpoint = %base_url, "TLS certificate verification disabled");
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| RemoteError::Transport(format!("http client: {e}")))?;

        let resp = send(
            client
                .post(format!("{base_url}/api/session"))
                .basic_auth(&config.username, Some(&config.password)),
            "create session",
        )
        .await?;
        let token: String = decode(resp, "create session").await?;

        info!(endpoint = %base_url, user = %config.username, "connected to vSphere");

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base_url,
                token,
            }),
        })
    }

    /// Log out (`DELETE /api/session`). Failures are logged and ignored.
    pub async fn disconnect(&self) {
        let req = self.request(Method::DELETE, "/api/session");
        match send(req, "delete session").await {
            Ok(_) => info!(endpoint = %self.inner.base_url, "disconnected from vSphere"),
            Err(e) => warn!(error = %e, "session logout failed (ignored)"),
        }
    }

    /// Build a request carrying the session token. `path` is appended to the
    /// base URL (e.g. `/api/vcenter/vm`).
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        self.inner
            .client
            .request(method, url)
            .header(SESSION_HEADER, &self.inner.token)
    }

    async fn get_process(
        &self,
        vm: &VmRef,
        credential: &GuestCredential,
        pid: i64,
    ) -> Result<Option<GuestProcessInfo>, RemoteError> {
        let path = format!("/api/vcenter/vm/{}/guest/processes/{pid}?action=get", vm.id);
        let req = self
            .request(Method::POST, &path)
            .json(&CredentialsRequest::from(credential));
        match send(req, "get process").await {
            Ok(resp) => {
                let info: ProcessInfo = decode(resp, "get process").await?;
                Ok(Some(info.into_guest_info(pid)))
            }
            Err(RemoteError::NotFound(detail)) => {
                debug!(pid, detail = %detail, "guest process not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl GuestOperations for VsphereSession {
    async fn resolve_vm(&self, name: &str) -> Result<Option<VmRef>, RemoteError> {
        let req = self
            .request(Method::GET, "/api/vcenter/vm")
            .query(&[("names", name)]);
        let resp = send(req, "list vms").await?;
        let vms: Vec<VmSummary> = decode(resp, "list vms").await?;

        let found = vms.into_iter().find(|vm| vm.name == name).map(|vm| VmRef {
            id: vm.vm,
            name: vm.name,
        });
        if found.is_none() {
            warn!(vm = name, "vm not found");
        }
        Ok(found)
    }

    async fn tools_status(&self, vm: &VmRef) -> Result<ToolsStatus, RemoteError> {
        let path = format!("/api/vcenter/vm/{}/tools", vm.id);
        let resp = send(self.request(Method::GET, &path), "get tools").await?;
        let tools: ToolsInfo = decode(resp, "get tools").await?;
        Ok(ToolsStatus {
            running: tools.run_state == TOOLS_RUNNING,
            run_state: tools.run_state,
            version_status: tools.version_status,
        })
    }

    async fn start_program(
        &self,
        vm: &VmRef,
        credential: &GuestCredential,
        spec: &ProcessSpec,
    ) -> Result<Option<i64>, RemoteError> {
        let path = format!("/api/vcenter/vm/{}/guest/processes?action=create", vm.id);
        let body = CreateProcessRequest {
            credentials: credential.into(),
            spec: spec.into(),
        };
        let resp = send(self.request(Method::POST, &path).json(&body), "start program").await?;
        let text = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("start program read: {e}")))?;
        parse_pid(&text)
    }

    async fn list_processes(
        &self,
        vm: &VmRef,
        credential: &GuestCredential,
        pids: &[i64],
    ) -> Result<Vec<GuestProcessInfo>, RemoteError> {
        if pids.is_empty() {
            let path = format!("/api/vcenter/vm/{}/guest/processes?action=list", vm.id);
            let req = self
                .request(Method::POST, &path)
                .json(&CredentialsRequest::from(credential));
            let resp = send(req, "list processes").await?;
            let summaries: Vec<ProcessSummary> = decode(resp, "list processes").await?;
            return Ok(summaries.into_iter().map(Into::into).collect());
        }

        let mut processes = Vec::with_capacity(pids.len());
        for &pid in pids {
            if let Some(info) = self.get_process(vm, credential, pid).await? {
                processes.push(info);
            }
        }
        Ok(processes)
    }
}

/// Send a request; non-success answers become classified [`RemoteError`]s.
async fn send(req: RequestBuilder, context: &str) -> Result<Response, RemoteError> {
    let resp = req
        .send()
        .await
        .map_err(|e| RemoteError::Transport(format!("{context}: {e}")))?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(classify(context, status, &body))
}

async fn decode<T: DeserializeOwned>(resp: Response, context: &str) -> Result<T, RemoteError> {
    resp.json()
        .await
        .map_err(|e| RemoteError::Transport(format!("{context} decode: {e}")))
}

/// The create call answers with the pid as a JSON number, a numeric string,
/// `null`, or an empty body.
fn parse_pid(body: &str) -> Result<Option<i64>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RemoteError::Transport(format!("start program decode: {e}")))?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => Ok(n.as_i64()),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RemoteError::Transport(format!("start program pid {s:?}: {e}"))),
        other => Err(RemoteError::Transport(format!(
            "start program: unexpected pid value {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pid_variants() {
        assert_eq!(parse_pid("4242").unwrap(), Some(4242));
        assert_eq!(parse_pid("\"4242\"").unwrap(), Some(4242));
        assert_eq!(parse_pid("null").unwrap(), None);
        assert_eq!(parse_pid("").unwrap(), None);
        assert_eq!(parse_pid("\"\"").unwrap(), None);
    }

    #[test]
    fn parse_pid_rejects_garbage() {
        assert!(parse_pid("\"abc\"").is_err());
        assert!(parse_pid("{\"pid\":1}").is_err());
    }
}
