use std::path::PathBuf;

use clap::Parser;

/// Run a command inside a vSphere VM guest through VMware Tools.
///
/// Exit status: the guest exit code (masked to a byte) on completion,
/// 1 on error, 2 if the VM is not found, 3 if the exit code is unknown or
/// the command did not finish in time.
#[derive(Debug, Parser)]
#[command(name = "vexec", version)]
pub struct Cli {
    /// vCenter or ESXi hostname/IP (or base URL)
    #[arg(long, env = "VEXEC_HOST")]
    pub host: Option<String>,
    /// vCenter/ESXi username (e.g. administrator@vsphere.local)
    #[arg(long, env = "VEXEC_USER")]
    pub user: Option<String>,
    /// vCenter/ESXi password (prompted if omitted)
    #[arg(long, env = "VEXEC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Disable TLS certificate verification (insecure)
    #[arg(long)]
    pub no_ssl_verify: bool,
    /// Target VM name (exact match)
    #[arg(long)]
    pub vm: String,
    /// Username inside the guest
    #[arg(long)]
    pub guest_user: String,
    /// Guest password (prompted if omitted)
    #[arg(long, env = "VEXEC_GUEST_PASSWORD", hide_env_values = true)]
    pub guest_pass: Option<String>,
    /// Full path of the program inside the guest (e.g. /bin/sh or C:\Windows\System32\cmd.exe)
    #[arg(long)]
    pub cmd: String,
    /// Arguments passed to the program, as one string
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub args: String,
    /// Working directory inside the guest
    #[arg(long)]
    pub working_dir: Option<String>,
    /// Seconds to wait for the program to finish [default: 60]
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Seconds between status polls [default: 1.0]
    #[arg(long)]
    pub poll_interval: Option<f64>,
    /// YAML profile with connection defaults
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}
