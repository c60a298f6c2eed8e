use guest_exec::{EXIT_FAILURE, ExecutionResult, GuestExecError};
use guest_exec_vsphere::VsphereSession;
use tracing::info;

use crate::config::Settings;
use crate::error::{VexecError, VexecResult};

/// Exit code when the VM name has no match.
pub const EXIT_VM_NOT_FOUND: u8 = 2;

/// Connect, run the command, and always log out afterwards.
pub async fn run(settings: &Settings) -> VexecResult<ExecutionResult> {
    let session = VsphereSession::connect(&settings.vsphere).await?;

    info!(
        vm = %settings.exec.vm_name,
        program = settings.exec.spec.program_path(),
        timeout_secs = settings.exec.policy.timeout().as_secs(),
        "running program in guest"
    );
    let result = guest_exec::execute(&session, &settings.exec).await;

    session.disconnect().await;
    Ok(result?)
}

/// Process exit code for the outcome of [`run`].
pub fn exit_code(result: &VexecResult<ExecutionResult>) -> u8 {
    match result {
        Ok(r) => r.exit_code(),
        Err(VexecError::Exec(GuestExecError::NotFound(_))) => EXIT_VM_NOT_FOUND,
        Err(_) => EXIT_FAILURE,
    }
}
