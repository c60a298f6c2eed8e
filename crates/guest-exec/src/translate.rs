use crate::types::{ExecStatus, ExecutionResult, FinalState, PollOutcome};

/// Map a poll outcome to the caller-facing result.
///
/// Exit codes are masked to a byte (`c & 0xFF`, i.e. `c mod 256` for
/// negative codes too); the unmasked code is kept in `raw_exit_code`.
pub fn translate(outcome: &PollOutcome) -> ExecutionResult {
    match outcome.final_state {
        FinalState::Exited(code) => ExecutionResult {
            status: ExecStatus::Completed(mask_exit_code(code)),
            raw_exit_code: Some(code),
        },
        FinalState::Vanished => ExecutionResult {
            status: ExecStatus::UnknownExit,
            raw_exit_code: None,
        },
        FinalState::TimedOut => ExecutionResult {
            status: ExecStatus::TimedOut,
            raw_exit_code: None,
        },
    }
}

fn mask_exit_code(code: i64) -> u8 {
    (code & 0xFF) as u8
}
