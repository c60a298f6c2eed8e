//! vSphere backend for `guest-exec`.
//!
//! Talks to the vSphere Automation REST API (`/api/...`) of a vCenter or ESXi
//! host. Guest operations go through VMware Tools inside the VM:
//!
//! - `POST /api/session` / `DELETE /api/session`: login and logout
//! - `GET /api/vcenter/vm?names=`: exact-name lookup
//! - `GET /api/vcenter/vm/{vm}/tools`: tools run state
//! - `POST /api/vcenter/vm/{vm}/guest/processes?action=create|list`
//! - `POST /api/vcenter/vm/{vm}/guest/processes/{pid}?action=get`

mod config;
mod error;
mod session;
mod types;

pub use config::{DEFAULT_REQUEST_TIMEOUT, VsphereConfig};
pub use session::VsphereSession;
