use std::path::Path;
use std::time::Duration;

use guest_exec::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, ExecOptions, GuestCredential, PollPolicy, ProcessSpec,
};
use guest_exec_vsphere::{DEFAULT_REQUEST_TIMEOUT, VsphereConfig};
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{VexecError, VexecResult};

/// Connection defaults read from a YAML profile. Passwords are never stored
/// here; they come from flags, the environment, or a prompt.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub host: Option<String>,
    pub user: Option<String>,
    pub insecure: bool,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<f64>,
    pub request_timeout_secs: Option<u64>,
}

/// Fully resolved inputs for one invocation.
#[derive(Debug)]
pub struct Settings {
    pub vsphere: VsphereConfig,
    pub exec: ExecOptions,
}

/// Load a profile from a YAML file.
pub async fn load(path: &Path) -> VexecResult<Profile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| VexecError::Config(format!("read {}: {e}", path.display())))?;
    serde_yaml_ng::from_str(&content)
        .map_err(|e| VexecError::Config(format!("parse {}: {e}", path.display())))
}

/// Merge CLI flags over the profile and fill in missing passwords with
/// `prompt`, which receives the prompt label.
pub fn resolve(
    cli: Cli,
    profile: Profile,
    mut prompt: impl FnMut(&str) -> VexecResult<String>,
) -> VexecResult<Settings> {
    let host = required(cli.host.or(profile.host), "host", "--host / VEXEC_HOST")?;
    let user = required(cli.user.or(profile.user), "user", "--user / VEXEC_USER")?;

    let timeout = cli
        .timeout
        .or(profile.timeout_secs)
        .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
    let interval = match cli.poll_interval.or(profile.poll_interval_secs) {
        Some(secs) => Duration::try_from_secs_f64(secs)
            .map_err(|e| VexecError::Config(format!("poll interval {secs}: {e}")))?,
        None => DEFAULT_POLL_INTERVAL,
    };
    let policy = PollPolicy::new(timeout, interval)?;
    let spec = ProcessSpec::new(cli.cmd, cli.args, cli.working_dir)?;

    let password = match cli.password {
        Some(p) => p,
        None => prompt("vSphere password")?,
    };
    let guest_password = match cli.guest_pass {
        Some(p) => p,
        None => prompt("Guest password")?,
    };

    let vsphere = VsphereConfig {
        endpoint: host,
        username: user,
        password,
        insecure: cli.no_ssl_verify || profile.insecure,
        request_timeout: profile
            .request_timeout_secs
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
    };
    let exec = ExecOptions {
        vm_name: cli.vm,
        credential: GuestCredential::new(cli.guest_user, guest_password),
        spec,
        policy,
    };

    Ok(Settings { vsphere, exec })
}

fn required(value: Option<String>, label: &str, hint: &str) -> VexecResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| VexecError::Config(format!("{label} is required (set in config or via {hint})")))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec![
            "vexec",
            "--vm",
            "web-01",
            "--guest-user",
            "root",
            "--cmd",
            "/bin/sh",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    fn no_prompt(label: &str) -> VexecResult<String> {
        panic!("unexpected prompt for {label}");
    }

    #[tokio::test]
    async fn load_full_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vexec.yaml");
        tokio::fs::write(
            &path,
            r#"
host: vcenter.example.com
user: administrator@vsphere.local
insecure: true
timeout_secs: 120
poll_interval_secs: 2.5
request_timeout_secs: 10
"#,
        )
        .await
        .unwrap();

        let profile = load(&path).await.unwrap();
        assert_eq!(
            profile,
            Profile {
                host: Some("vcenter.example.com".into()),
                user: Some("administrator@vsphere.local".into()),
                insecure: true,
                timeout_secs: Some(120),
                poll_interval_secs: Some(2.5),
                request_timeout_secs: Some(10),
            }
        );
    }

    #[tokio::test]
    async fn load_rejects_password_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vexec.yaml");
        tokio::fs::write(&path, "host: vc\npassword: secret\n")
            .await
            .unwrap();

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, VexecError::Config(_)), "{err}");
    }

    #[tokio::test]
    async fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("absent.yaml"), "{err}");
    }

    #[test]
    fn cli_overrides_profile() {
        let profile = Profile {
            host: Some("vc-profile".into()),
            user: Some("profile-user".into()),
            timeout_secs: Some(120),
            poll_interval_secs: Some(5.0),
            ..Profile::default()
        };
        let settings = resolve(
            cli(&[
                "--host",
                "vc-cli",
                "--password",
                "pw",
                "--guest-pass",
                "gpw",
                "--timeout",
                "30",
            ]),
            profile,
            no_prompt,
        )
        .unwrap();

        assert_eq!(settings.vsphere.endpoint, "vc-cli");
        assert_eq!(settings.vsphere.username, "profile-user");
        assert_eq!(settings.exec.policy.timeout(), Duration::from_secs(30));
        assert_eq!(settings.exec.policy.interval(), Duration::from_secs(5));
    }

    #[test]
    fn defaults_apply_without_profile() {
        let settings = resolve(
            cli(&["--host", "vc", "--user", "u", "--password", "pw", "--guest-pass", "gpw"]),
            Profile::default(),
            no_prompt,
        )
        .unwrap();

        assert_eq!(settings.exec.policy, PollPolicy::default());
        assert_eq!(settings.vsphere.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!settings.vsphere.insecure);
        assert_eq!(settings.exec.spec.program_path(), "/bin/sh");
    }

    #[test]
    fn missing_passwords_are_prompted() {
        let mut asked = Vec::new();
        let settings = resolve(
            cli(&["--host", "vc", "--user", "u"]),
            Profile::default(),
            |label| {
                asked.push(label.to_string());
                Ok(format!("{label}-secret"))
            },
        )
        .unwrap();

        assert_eq!(asked, vec!["vSphere password", "Guest password"]);
        assert_eq!(settings.vsphere.password, "vSphere password-secret");
        assert_eq!(settings.exec.credential.password(), "Guest password-secret");
    }

    #[test]
    fn missing_host_is_config_error() {
        let err = resolve(cli(&["--user", "u"]), Profile::default(), no_prompt).unwrap_err();
        assert!(err.to_string().contains("host is required"), "{err}");
    }

    #[test]
    fn invalid_poll_interval_rejected() {
        let flags = ["--host", "vc", "--user", "u", "--password", "pw", "--guest-pass", "gpw"];

        let err = resolve(
            cli(&flags),
            Profile {
                poll_interval_secs: Some(-1.0),
                ..Profile::default()
            },
            no_prompt,
        )
        .unwrap_err();
        assert!(matches!(err, VexecError::Config(_)), "{err}");

        let mut zero = flags.to_vec();
        zero.extend_from_slice(&["--poll-interval", "0"]);
        let err = resolve(cli(&zero), Profile::default(), no_prompt).unwrap_err();
        assert!(matches!(err, VexecError::Exec(_)), "{err}");
    }
}
