mod cli;
mod config;
mod error;
mod prompt;
mod run;

use std::fmt;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::fmt::time::FormatTime;

use crate::cli::Cli;
use crate::error::{VexecError, VexecResult};

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let result = invoke(cli).await;

    match &result {
        Ok(r) => info!(status = ?r.status, exit_code = r.exit_code(), "done"),
        Err(e) => {
            if let VexecError::Exec(err) = e
                && let Some(r) = err.launch_failure()
            {
                error!(status = ?r.status, "process was not started");
            }
            error!(error = %e, "fatal error");
        }
    }

    ExitCode::from(run::exit_code(&result))
}

async fn invoke(cli: Cli) -> VexecResult<guest_exec::ExecutionResult> {
    let profile = match &cli.config {
        Some(path) => config::load(path).await?,
        None => config::Profile::default(),
    };
    let settings = config::resolve(cli, profile, prompt::password)?;
    run::run(&settings).await
}
