//! Registry and cache test utilities

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use release_updater::config::{ApiConfig, UpdaterConfig};
use release_updater::updater::host::UpdateTransient;
use release_updater::version::cache::Cache;
use release_updater::version::error::RegistryError;
use release_updater::version::registries::GitHubRegistry;
use release_updater::version::registry::ReleaseRegistry;
use release_updater::version::types::RepoIdentity;

pub const OWNER: &str = "Jared-Nolt";
pub const REPO: &str = "rm-github-plugin";
pub const SLUG: &str = "rm-github-plugin";
pub const PLUGIN: &str = "rm-github-plugin/rm-github-plugin.php";
pub const CACHE_KEY: &str = "rm-github-plugin_updater";
pub const LATEST_PATH: &str = "/repos/Jared-Nolt/rm-github-plugin/releases/latest";

/// Mock registry returning a fixed body and counting calls
pub struct MockRegistry {
    body: Option<String>,
    calls: AtomicUsize,
}

impl MockRegistry {
    pub fn with_tag(tag: &str) -> Self {
        Self {
            body: Some(format!(r#"{{"tag_name": "{}"}}"#, tag)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            body: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseRegistry for MockRegistry {
    async fn fetch_latest_release(&self, repo: &RepoIdentity) -> Result<String, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.body
            .clone()
            .ok_or_else(|| RegistryError::NotFound(repo.full_name()))
    }
}

/// Updater config pointing both API and web hosts at `base_url`
pub fn create_test_config(base_url: &str, version: &str) -> UpdaterConfig {
    UpdaterConfig {
        plugin_name: Some("RM GitHub Plugin".to_string()),
        api: ApiConfig {
            api_base_url: base_url.to_string(),
            web_base_url: base_url.to_string(),
            timeout_ms: 2_000,
        },
        ..UpdaterConfig::new(OWNER, REPO, version)
    }
}

pub fn create_test_registry(base_url: &str) -> Arc<GitHubRegistry> {
    Arc::new(GitHubRegistry::new(base_url).unwrap())
}

/// Create an empty on-disk cache
pub fn create_test_cache() -> (TempDir, Arc<Cache>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let cache = Cache::new(&db_path).unwrap();

    (temp_dir, Arc::new(cache))
}

/// Update state as left by the host's own check pass
pub fn checked_transient(version: &str) -> UpdateTransient {
    let mut transient = UpdateTransient::default();
    transient
        .checked
        .insert(PLUGIN.to_string(), version.to_string());
    transient
}
