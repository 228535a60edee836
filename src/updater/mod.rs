//! Host-facing update checks
//!
//! - [`evaluator`]: answers "is there update metadata?" and "is there a newer version?"
//! - [`hooks`]: the `HostHooks` contract a host application calls into
//! - [`host`]: typed records exchanged with the host
//! - [`admin`]: manual "Check for updates" link and request handling

pub mod admin;
pub mod evaluator;
pub mod hooks;
pub mod host;

pub use evaluator::UpdateEvaluator;
pub use hooks::HostHooks;
