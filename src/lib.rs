//! Checks a GitHub repository for its latest release and tells a host
//! application whether a newer version of its plugin is available.

pub mod config;
pub mod logging;
pub mod updater;
pub mod version;

pub use config::UpdaterConfig;
pub use updater::{HostHooks, UpdateEvaluator};
