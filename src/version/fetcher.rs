//! Fetch the latest release and populate the cache
//!
//! Every failure (transport, status, empty or unparseable body) is logged and
//! collapsed into `None`; nothing is written to the cache in that case.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::version::cache::ReleaseStorer;
use crate::version::registry::ReleaseRegistry;
use crate::version::types::{ReleaseInfo, RepoIdentity};

/// Where and for how long a successful fetch is cached
pub struct CacheTarget<S: ReleaseStorer> {
    pub storer: Arc<S>,
    pub key: String,
    pub ttl_ms: i64,
}

pub struct ReleaseFetcher<S: ReleaseStorer> {
    registry: Arc<dyn ReleaseRegistry>,
    repo: RepoIdentity,
    web_base_url: String,
    cache: Option<CacheTarget<S>>,
}

impl<S: ReleaseStorer> ReleaseFetcher<S> {
    pub fn new(
        registry: Arc<dyn ReleaseRegistry>,
        repo: RepoIdentity,
        web_base_url: &str,
        cache: Option<CacheTarget<S>>,
    ) -> Self {
        Self {
            registry,
            repo,
            web_base_url: web_base_url.to_string(),
            cache,
        }
    }

    pub fn repo(&self) -> &RepoIdentity {
        &self.repo
    }

    pub fn web_base_url(&self) -> &str {
        &self.web_base_url
    }

    /// Fetch the latest release, caching the raw body on success.
    ///
    /// Returns `None` when no usable release data could be obtained.
    pub async fn fetch(&self) -> Option<ReleaseInfo> {
        let repo_name = self.repo.full_name();

        let body = self
            .registry
            .fetch_latest_release(&self.repo)
            .await
            .inspect_err(|e| warn!("Failed to fetch latest release for {}: {}", repo_name, e))
            .ok()?;

        let info = ReleaseInfo::from_body(&body, &self.repo, &self.web_base_url)
            .inspect_err(|e| warn!("Failed to parse latest release for {}: {}", repo_name, e))
            .ok()?;

        info!(
            "Fetched latest release {} for {}",
            info.tag_name.as_deref().unwrap_or("<untagged>"),
            repo_name
        );

        if let Some(cache) = &self.cache {
            let _ = cache
                .storer
                .put(&cache.key, &body, cache.ttl_ms)
                .inspect_err(|e| error!("Failed to cache release for {}: {}", repo_name, e));
        }

        Some(info)
    }
}
