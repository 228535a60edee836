//! Release fetching, caching and comparison
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│   Fetcher   │────▶│    Cache    │
//! │  (GitHub)   │     │(parse, put) │     │  (SQLite)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌──────────────────────────────┐
//!                     │   updater::UpdateEvaluator   │
//!                     │     (semver::compare)        │
//!                     └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: `ReleaseStorer` trait and SQLite-backed cache with TTL and purge
//! - [`fetcher`]: fetches the latest release and populates the cache
//! - [`registry`]: Registry trait for fetching release metadata
//! - [`registries`]: Concrete registry implementations (GitHub)
//! - [`error`]: Error types for cache and registry operations
//! - [`semver`]: Version comparison tolerant of "v" prefixes
//! - [`types`]: `RepoIdentity` and `ReleaseInfo`

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;
