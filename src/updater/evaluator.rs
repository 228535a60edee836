use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{UpdaterConfig, data_dir, db_path};
use crate::updater::host::{
    Filtered, PluginInfo, Sections, UpdateRecord, UpdateTransient, UpgradeOptions,
};
use crate::version::cache::{Cache, ReleaseStorer};
use crate::version::fetcher::{CacheTarget, ReleaseFetcher};
use crate::version::registries::GitHubRegistry;
use crate::version::registry::ReleaseRegistry;
use crate::version::semver::{compare, strip_tag_prefix};
use crate::version::types::{ReleaseInfo, RepoIdentity};

/// Answers the host's update questions for a single upstream repository
pub struct UpdateEvaluator<S: ReleaseStorer> {
    config: UpdaterConfig,
    storer: Option<Arc<S>>,
    fetcher: ReleaseFetcher<S>,
}

impl UpdateEvaluator<Cache> {
    /// Build an evaluator backed by GitHub and the on-disk cache.
    ///
    /// A cache that cannot be opened is logged and the evaluator runs
    /// without one.
    pub fn from_config(config: UpdaterConfig) -> anyhow::Result<Self> {
        let registry = GitHubRegistry::builder(&config.api.api_base_url)
            .user_agent(format!(
                "release-updater/{}; {}",
                env!("CARGO_PKG_VERSION"),
                config.slug()
            ))
            .auth_token(config.auth_token())
            .timeout(Duration::from_millis(config.api.timeout_ms))
            .danger_accept_invalid_certs(config.dev_mode)
            .build()?;

        let storer = if config.cache.enabled {
            Self::initialize_storer()
        } else {
            None
        };

        Ok(Self::build(config, Arc::new(registry), storer))
    }

    fn initialize_storer() -> Option<Arc<Cache>> {
        let data_dir = data_dir();
        let db_path = db_path();

        // Create data directory if it doesn't exist
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            error!("Failed to create data directory {:?}: {}", data_dir, e);
            return None;
        }

        match Cache::new(&db_path) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                error!("Failed to initialize cache: {}", e);
                None
            }
        }
    }
}

impl<S: ReleaseStorer> UpdateEvaluator<S> {
    /// Build an evaluator with a custom registry and storer.
    ///
    /// The storer is ignored when caching is disabled in `config`.
    pub fn build(
        config: UpdaterConfig,
        registry: Arc<dyn ReleaseRegistry>,
        storer: Option<Arc<S>>,
    ) -> Self {
        let storer = storer.filter(|_| config.cache.enabled);
        let repo = RepoIdentity::new(config.owner.as_str(), config.repo.as_str());
        let cache_target = storer.clone().map(|storer| CacheTarget {
            storer,
            key: config.cache_key(),
            ttl_ms: config.cache.ttl_ms,
        });
        let fetcher = ReleaseFetcher::new(registry, repo, &config.api.web_base_url, cache_target);

        Self {
            config,
            storer,
            fetcher,
        }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn slug(&self) -> &str {
        self.config.slug()
    }

    pub fn cache_enabled(&self) -> bool {
        self.storer.is_some()
    }

    /// Latest release from the cache, or from the registry on a miss
    pub async fn resolve_release(&self) -> Option<ReleaseInfo> {
        if let Some(info) = self.cached_release() {
            return Some(info);
        }

        self.fetcher.fetch().await
    }

    fn cached_release(&self) -> Option<ReleaseInfo> {
        let storer = self.storer.as_ref()?;
        let key = self.config.cache_key();

        let body = storer
            .get(&key)
            .inspect_err(|e| error!("Failed to read cache entry {}: {}", key, e))
            .ok()??;

        match ReleaseInfo::from_body(&body, self.fetcher.repo(), self.fetcher.web_base_url()) {
            Ok(info) => {
                debug!("Cache hit for {}", key);
                Some(info)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Plugin details for `requested_slug`, or passthrough when the slug
    /// belongs to someone else or no release data is available.
    pub async fn describe(&self, requested_slug: &str) -> Filtered<PluginInfo> {
        if requested_slug != self.slug() {
            return Filtered::Passthrough;
        }

        let Some(info) = self.resolve_release().await else {
            return Filtered::Passthrough;
        };

        let name = self.config.plugin_name().to_string();
        let version = info
            .version()
            .map(str::to_string)
            .unwrap_or_else(|| self.config.version.clone());

        Filtered::Replace(PluginInfo {
            slug: self.slug().to_string(),
            version,
            author: self.config.owner.clone(),
            homepage: format!(
                "{}/{}",
                self.config.api.web_base_url.trim_end_matches('/'),
                self.fetcher.repo().full_name()
            ),
            download_link: info.zip_download_url.clone(),
            trunk: info.zip_download_url.clone(),
            last_updated: info.last_updated(),
            sections: Sections {
                description: format!("{} auto-updates from GitHub releases.", name),
                installation: "Install as a standard plugin.".to_string(),
                changelog: info.body.clone().unwrap_or_default(),
            },
            name,
        })
    }

    /// Adds an update record to `transient` when the latest release is newer
    /// than the installed version.
    ///
    /// A transient the host has not yet populated is returned as is.
    pub async fn check_for_update(&self, transient: UpdateTransient) -> UpdateTransient {
        if !transient.has_been_checked() {
            return transient;
        }

        let Some(info) = self.resolve_release().await else {
            return transient;
        };
        let Some(tag) = info.tag_name.as_deref() else {
            return transient;
        };

        if compare(&self.config.version, tag) != Ordering::Less {
            debug!("{} is up to date ({} >= {})", self.slug(), self.config.version, tag);
            return transient;
        }

        let record = UpdateRecord {
            slug: self.slug().to_string(),
            plugin: self.config.basename(),
            new_version: strip_tag_prefix(tag).to_string(),
            package: info.zip_download_url.clone(),
        };
        info!(
            "Update available for {}: {} -> {}",
            self.slug(),
            self.config.version,
            record.new_version
        );

        let mut transient = transient;
        transient.response.insert(record.plugin.clone(), record);
        transient
    }

    /// Drops the cached release once the host finished updating plugins
    pub fn on_upgrade_completed(&self, options: &UpgradeOptions) {
        let Some(storer) = &self.storer else {
            return;
        };
        if !options.is_plugin_update() {
            return;
        }

        let _ = storer
            .purge(&self.config.cache_key())
            .inspect_err(|e| error!("Failed to purge release cache: {}", e));
    }
}
