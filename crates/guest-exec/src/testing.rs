//! Scripted in-memory backend for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::RemoteError;
use crate::ops::GuestOperations;
use crate::types::{GuestCredential, GuestProcessInfo, ProcessSpec, ToolsStatus, VmRef};

type PollResponse = Result<Vec<GuestProcessInfo>, RemoteError>;

pub(crate) fn vm() -> VmRef {
    VmRef {
        id: "vm-42".into(),
        name: "web-01".into(),
    }
}

pub(crate) fn credential() -> GuestCredential {
    GuestCredential::new("root", "hunter2")
}

pub(crate) fn running(pid: i64) -> GuestProcessInfo {
    GuestProcessInfo {
        pid,
        name: Some("sh".into()),
        command: Some("/bin/sh -c true".into()),
        started: None,
        exit_code: None,
    }
}

pub(crate) fn exited(pid: i64, code: i64) -> GuestProcessInfo {
    GuestProcessInfo {
        exit_code: Some(code),
        ..running(pid)
    }
}

pub(crate) struct ScriptedGuest {
    pub vm: Option<VmRef>,
    pub tools: Result<ToolsStatus, RemoteError>,
    pub start: Result<Option<i64>, RemoteError>,
    /// Answers consumed one per `list_processes` call.
    polls: Mutex<VecDeque<PollResponse>>,
    /// Answer once `polls` is drained.
    fallback: PollResponse,
    /// Simulated latency of each `list_processes` call.
    pub poll_delay: Duration,
    pub start_calls: AtomicUsize,
    pub list_calls: Mutex<Vec<(Vec<i64>, Instant)>>,
}

impl ScriptedGuest {
    pub fn new(start: Result<Option<i64>, RemoteError>) -> Self {
        Self {
            vm: Some(vm()),
            tools: Ok(ToolsStatus {
                running: true,
                run_state: "RUNNING".into(),
                version_status: Some("CURRENT".into()),
            }),
            start,
            polls: Mutex::new(VecDeque::new()),
            fallback: Ok(vec![running(100)]),
            poll_delay: Duration::ZERO,
            start_calls: AtomicUsize::new(0),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_polls(self, polls: Vec<PollResponse>) -> Self {
        *self.polls.lock().unwrap() = polls.into();
        self
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GuestOperations for ScriptedGuest {
    async fn resolve_vm(&self, name: &str) -> Result<Option<VmRef>, RemoteError> {
        Ok(self.vm.clone().filter(|vm| vm.name == name))
    }

    async fn tools_status(&self, _vm: &VmRef) -> Result<ToolsStatus, RemoteError> {
        self.tools.clone()
    }

    async fn start_program(
        &self,
        _vm: &VmRef,
        _credential: &GuestCredential,
        _spec: &ProcessSpec,
    ) -> Result<Option<i64>, RemoteError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.start.clone()
    }

    async fn list_processes(
        &self,
        _vm: &VmRef,
        _credential: &GuestCredential,
        pids: &[i64],
    ) -> Result<Vec<GuestProcessInfo>, RemoteError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((pids.to_vec(), Instant::now()));
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        let next = self.polls.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
