use std::io::{self, BufRead, Write};

use nix::sys::termios::{self, LocalFlags, SetArg};

use crate::error::{VexecError, VexecResult};

/// Ask for a password on stderr and read it from stdin with echo off.
///
/// When stdin is not a terminal the line is read as is.
pub fn password(label: &str) -> VexecResult<String> {
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;

    let saved = termios::tcgetattr(&stdin).ok();
    if let Some(saved) = &saved {
        let mut silent = saved.clone();
        silent.local_flags.remove(LocalFlags::ECHO);
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &silent)
            .map_err(|e| VexecError::Prompt(format!("disable echo: {e}")))?;
    }

    let mut line = String::new();
    let read = stdin.lock().read_line(&mut line);

    if let Some(saved) = &saved {
        let _ = termios::tcsetattr(&stdin, SetArg::TCSANOW, saved);
        writeln!(stderr)?;
    }
    read?;

    let value = line.trim_end_matches(['\r', '\n']);
    if value.is_empty() {
        return Err(VexecError::Prompt(format!("{label} must not be empty")));
    }
    Ok(value.to_string())
}
