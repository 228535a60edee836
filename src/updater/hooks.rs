//! Entry points the host application calls into
//!
//! The host registers an updater once and invokes these directly instead of
//! dispatching through string-named filters.

use reqwest::Url;
use tracing::debug;

use crate::config::UpdaterConfig;
use crate::updater::evaluator::UpdateEvaluator;
use crate::updater::host::{Filtered, PluginInfo, RequestArgs, UpdateTransient, UpgradeOptions};
use crate::version::cache::ReleaseStorer;

/// Metadata query action the updater answers
pub const PLUGIN_INFORMATION_ACTION: &str = "plugin_information";

const DEFAULT_DOWNLOAD_USER_AGENT: &str = concat!("release-updater/", env!("CARGO_PKG_VERSION"));

#[async_trait::async_trait]
pub trait HostHooks: Send + Sync {
    /// Plugin metadata query. Passthrough leaves the host's response as is.
    async fn on_query_plugin_info(&self, action: &str, slug: &str) -> Filtered<PluginInfo>;

    /// Update-list filter applied whenever the host reads its update state
    async fn on_filter_update_list(&self, transient: UpdateTransient) -> UpdateTransient;

    /// Called after the host's upgrader finished. Only the event options
    /// matter here; the upgrader instance the host passes alongside them is
    /// not needed and is not part of this signature.
    fn on_upgrade_complete(&self, options: &UpgradeOptions);

    /// Outbound HTTP request filter, used to authenticate archive downloads
    fn on_outbound_request(&self, args: RequestArgs, url: &str) -> RequestArgs;
}

#[async_trait::async_trait]
impl<S: ReleaseStorer> HostHooks for UpdateEvaluator<S> {
    async fn on_query_plugin_info(&self, action: &str, slug: &str) -> Filtered<PluginInfo> {
        if action != PLUGIN_INFORMATION_ACTION {
            return Filtered::Passthrough;
        }
        self.describe(slug).await
    }

    async fn on_filter_update_list(&self, transient: UpdateTransient) -> UpdateTransient {
        self.check_for_update(transient).await
    }

    fn on_upgrade_complete(&self, options: &UpgradeOptions) {
        self.on_upgrade_completed(options);
    }

    fn on_outbound_request(&self, args: RequestArgs, url: &str) -> RequestArgs {
        authenticate_request(self.config(), args, url)
    }
}

/// Attach the configured token to requests aimed at the hosting provider.
///
/// The API host, the web host and their subdomains qualify, so private
/// archive downloads succeed after redirecting to a download host.
/// Requests to any other host are returned unchanged.
pub fn authenticate_request(
    config: &UpdaterConfig,
    mut args: RequestArgs,
    url: &str,
) -> RequestArgs {
    let Some(token) = config.auth_token() else {
        return args;
    };
    if !is_provider_url(config, url) {
        return args;
    }

    debug!("Attaching authorization to request for {}", url);
    args.set_header("Authorization", format!("token {}", token));
    if args.header("User-Agent").is_none() {
        args.set_header("User-Agent", DEFAULT_DOWNLOAD_USER_AGENT.to_string());
    }
    args
}

fn is_provider_url(config: &UpdaterConfig, url: &str) -> bool {
    let Some(target) = host_of(url) else {
        return false;
    };

    [&config.api.api_base_url, &config.api.web_base_url]
        .into_iter()
        .filter_map(|base| host_of(base))
        .any(|provider| target == provider || target.ends_with(&format!(".{}", provider)))
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.to_ascii_lowercase())
}
