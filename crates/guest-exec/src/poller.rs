use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::PollPolicy;
use crate::error::{GuestExecError, RemoteError, Result};
use crate::ops::GuestOperations;
use crate::types::{
    FinalState, GuestCredential, GuestProcessInfo, PollOutcome, ProcessHandle, ProcessState,
    VmRef,
};

/// Guest clocks may lag the host; processes that started up to this many
/// seconds before the local launch time still count as ours.
const START_SKEW_SECS: i64 = 30;

/// Stand-in deadline when `entry + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// The process being waited on. `pid` is filled in once a pid-less handle
/// has been matched against the guest process list.
struct Target {
    pid: Option<i64>,
    program_path: String,
    launched_at: DateTime<Utc>,
}

/// Poll the guest until the process behind `handle` reaches a terminal state
/// or the deadline (`entry + policy.timeout()`) passes.
///
/// The first query is issued immediately. A query error before the deadline
/// fails with [`GuestExecError::Poll`]. After the deadline one grace query is
/// made; an exit code from it wins over `TimedOut`, and its errors are
/// discarded.
pub async fn await_completion(
    ops: &dyn GuestOperations,
    vm: &VmRef,
    credential: &GuestCredential,
    handle: ProcessHandle,
    policy: PollPolicy,
) -> Result<PollOutcome> {
    let started = Instant::now();
    let deadline = started
        .checked_add(policy.timeout())
        .unwrap_or_else(|| started + FAR_FUTURE);
    let mut target = Target {
        pid: handle.pid,
        program_path: handle.program_path,
        launched_at: handle.launched_at,
    };

    info!(
        vm = %vm.name,
        pid = target.pid,
        timeout_secs = policy.timeout().as_secs_f64(),
        "waiting for guest process"
    );

    while Instant::now() <= deadline {
        let state = query(ops, vm, credential, &mut target)
            .await
            .map_err(|e| GuestExecError::Poll(e.to_string()))?;

        match state {
            ProcessState::Exited(code) => {
                info!(pid = target.pid, exit_code = code, "guest process finished");
                return Ok(outcome(FinalState::Exited(code), started));
            }
            ProcessState::Vanished => {
                warn!(
                    pid = target.pid,
                    "process list returned no entry; process may have exited"
                );
                return Ok(outcome(FinalState::Vanished, started));
            }
            ProcessState::Running => {
                debug!(
                    pid = target.pid,
                    interval_ms = policy.interval().as_millis() as u64,
                    "guest process still running"
                );
                tokio::time::sleep(policy.interval()).await;
            }
        }
    }

    warn!(pid = target.pid, "timeout reached waiting for guest process");

    // Grace query: best effort, errors are dropped and the result stays TimedOut.
    let final_state = match query(ops, vm, credential, &mut target).await {
        Ok(ProcessState::Exited(code)) => {
            info!(pid = target.pid, exit_code = code, "guest process finished at deadline");
            FinalState::Exited(code)
        }
        Ok(_) => FinalState::TimedOut,
        Err(e) => {
            debug!(pid = target.pid, error = %e, "grace query failed (ignored)");
            FinalState::TimedOut
        }
    };

    Ok(outcome(final_state, started))
}

fn outcome(final_state: FinalState, started: Instant) -> PollOutcome {
    PollOutcome {
        final_state,
        elapsed: started.elapsed(),
    }
}

/// One poll tick.
async fn query(
    ops: &dyn GuestOperations,
    vm: &VmRef,
    credential: &GuestCredential,
    target: &mut Target,
) -> std::result::Result<ProcessState, RemoteError> {
    if let Some(pid) = target.pid {
        let processes = ops.list_processes(vm, credential, &[pid]).await?;
        return Ok(processes
            .first()
            .map_or(ProcessState::Vanished, GuestProcessInfo::state));
    }

    let processes = ops.list_processes(vm, credential, &[]).await?;
    match find_launched(&processes, &target.program_path, target.launched_at) {
        Some(info) => {
            warn!(
                pid = info.pid,
                program = %target.program_path,
                "matched guest process by program path"
            );
            target.pid = Some(info.pid);
            Ok(info.state())
        }
        None => Ok(ProcessState::Vanished),
    }
}

/// `command` starts with `program_path` as a whole token, optionally quoted.
fn invokes(command: &str, program_path: &str) -> bool {
    let command = command.trim_start();
    if let Some(rest) = command
        .strip_prefix('"')
        .and_then(|c| c.strip_prefix(program_path))
    {
        return rest.starts_with('"');
    }
    command
        .strip_prefix(program_path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Pick the most recently started process that runs `program_path` and did
/// not start before `launched_at` (less the skew allowance).
fn find_launched<'a>(
    processes: &'a [GuestProcessInfo],
    program_path: &str,
    launched_at: DateTime<Utc>,
) -> Option<&'a GuestProcessInfo> {
    let earliest = launched_at - TimeDelta::seconds(START_SKEW_SECS);
    processes
        .iter()
        .filter(|p| runs_program(p, program_path))
        .filter(|p| p.started.is_none_or(|s| s >= earliest))
        .max_by_key(|p| p.started)
}

fn runs_program(info: &GuestProcessInfo, program_path: &str) -> bool {
    let file_name = program_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(program_path);
    let by_command = info
        .command
        .as_deref()
        .is_some_and(|c| invokes(c, program_path));
    let by_name = info
        .name
        .as_deref()
        .is_some_and(|n| n.eq_ignore_ascii_case(file_name));
    by_command || by_name
}
