//! Registry implementations for fetching release metadata

pub mod github;

pub use github::GitHubRegistry;
