use tracing::{info, warn};

use crate::config::ExecOptions;
use crate::error::{GuestExecError, Result};
use crate::launcher::launch;
use crate::ops::GuestOperations;
use crate::poller::await_completion;
use crate::translate::translate;
use crate::types::{ExecutionResult, FinalState, VmRef};

/// Run one program in the guest of the VM named in `options`.
///
/// Resolve, warn if guest tools are not running, launch, poll, translate.
/// Lookup failures surface as [`GuestExecError::NotFound`] or
/// [`GuestExecError::Lookup`]; launch and poll errors as documented on
/// [`launch`] and [`await_completion`].
pub async fn execute(ops: &dyn GuestOperations, options: &ExecOptions) -> Result<ExecutionResult> {
    let vm = ops
        .resolve_vm(&options.vm_name)
        .await?
        .ok_or_else(|| GuestExecError::NotFound(options.vm_name.clone()))?;
    info!(vm = %vm.name, id = %vm.id, "found vm");

    check_tools(ops, &vm).await;

    let handle = launch(ops, &vm, &options.credential, &options.spec).await?;
    let outcome = await_completion(ops, &vm, &options.credential, handle, options.policy).await?;
    let result = translate(&outcome);

    let elapsed_ms = outcome.elapsed.as_millis() as u64;
    match outcome.final_state {
        FinalState::Exited(raw) => info!(
            exit_code = result.exit_code(),
            raw_exit_code = raw,
            elapsed_ms,
            "process completed"
        ),
        FinalState::Vanished => warn!(elapsed_ms, "process exit code unknown"),
        FinalState::TimedOut => warn!(elapsed_ms, "process did not finish within timeout"),
    }

    Ok(result)
}

/// Tools readiness only produces a warning; the launch is attempted anyway.
async fn check_tools(ops: &dyn GuestOperations, vm: &VmRef) {
    match ops.tools_status(vm).await {
        Ok(status) if status.running => {}
        Ok(status) => warn!(
            vm = %vm.name,
            run_state = %status.run_state,
            version_status = status.version_status.as_deref().unwrap_or("unknown"),
            "guest tools not running, guest operations may fail"
        ),
        Err(e) => warn!(vm = %vm.name, error = %e, "could not read guest tools status"),
    }
}
