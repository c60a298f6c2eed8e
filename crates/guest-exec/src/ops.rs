use async_trait::async_trait;

use crate::error::RemoteError;
use crate::types::{GuestCredential, GuestProcessInfo, ProcessSpec, ToolsStatus, VmRef};

/// Guest-operations surface of an authenticated hypervisor session.
///
/// Every call is awaited to completion before the next one is issued; the
/// only per-call timeout is whatever the backend's transport applies.
#[async_trait]
pub trait GuestOperations: Send + Sync {
    // -- lookup --
    /// Exact-name VM lookup. `Ok(None)` when nothing matches.
    async fn resolve_vm(&self, name: &str) -> Result<Option<VmRef>, RemoteError>;
    async fn tools_status(&self, vm: &VmRef) -> Result<ToolsStatus, RemoteError>;

    // -- guest processes --
    /// Start a program in the guest. Returns the guest pid when the API
    /// reports one.
    async fn start_program(
        &self,
        vm: &VmRef,
        credential: &GuestCredential,
        spec: &ProcessSpec,
    ) -> Result<Option<i64>, RemoteError>;
    /// List guest processes restricted to `pids`. An empty slice lists all
    /// processes. Pids unknown to the guest are omitted from the result.
    async fn list_processes(
        &self,
        vm: &VmRef,
        credential: &GuestCredential,
        pids: &[i64],
    ) -> Result<Vec<GuestProcessInfo>, RemoteError>;
}
