use std::fmt;
use std::time::Duration;

use guest_exec::RemoteError;
use url::Url;

/// Default timeout for a single REST call. Bounds each guest query; the
/// overall wait is bounded by the poll policy.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a vCenter or ESXi endpoint.
#[derive(Clone)]
pub struct VsphereConfig {
    /// Host name (`https://` is assumed) or full base URL.
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    pub request_timeout: Duration,
}

impl VsphereConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            insecure: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Base URL without a trailing slash.
    pub(crate) fn base_url(&self) -> Result<String, RemoteError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(RemoteError::Transport("endpoint must not be empty".into()));
        }
        let raw = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };
        let url = Url::parse(&raw)
            .map_err(|e| RemoteError::Transport(format!("invalid endpoint {endpoint}: {e}")))?;
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

impl fmt::Debug for VsphereConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VsphereConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
