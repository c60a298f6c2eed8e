use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{GuestExecError, RemoteError, Result};
use crate::ops::GuestOperations;
use crate::types::{GuestCredential, ProcessHandle, ProcessSpec, VmRef};

/// Start `spec` in the guest of `vm`.
///
/// Rejected guest credentials fail with [`GuestExecError::Authentication`],
/// any other remote failure with [`GuestExecError::Launch`]. Neither is
/// retried. A successful call that returns no pid yields a handle with
/// `pid: None`.
pub async fn launch(
    ops: &dyn GuestOperations,
    vm: &VmRef,
    credential: &GuestCredential,
    spec: &ProcessSpec,
) -> Result<ProcessHandle> {
    let launched_at = Utc::now();
    let pid = ops
        .start_program(vm, credential, spec)
        .await
        .map_err(|e| {
            error!(vm = %vm.name, program = spec.program_path(), error = %e, "start program failed");
            match e {
                RemoteError::Unauthenticated(detail) => GuestExecError::Authentication(detail),
                other => GuestExecError::Launch(other.to_string()),
            }
        })?;

    match pid {
        Some(pid) => info!(
            vm = %vm.name,
            program = spec.program_path(),
            arguments = spec.arguments(),
            pid,
            "started program in guest"
        ),
        None => warn!(
            vm = %vm.name,
            program = spec.program_path(),
            "start program returned no pid, will match the process by path"
        ),
    }

    Ok(ProcessHandle {
        pid,
        program_path: spec.program_path().to_string(),
        launched_at,
    })
}
