//! Manual "Check for updates" link on the plugin listing page
//!
//! The link carries the plugin slug and a nonce issued by the host. Following
//! it clears the host's update state so the next page load re-runs the check.

use indexmap::IndexMap;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{MANUAL_CHECK_ACTION, UPDATE_CAPABILITY};
use crate::updater::evaluator::UpdateEvaluator;
use crate::version::cache::ReleaseStorer;

const PLUGINS_PAGE: &str = "plugins.php";

/// Admin-side services provided by the host application
pub trait AdminHost {
    /// Absolute URL of an admin page, e.g. `admin_url("plugins.php")`
    fn admin_url(&self, path: &str) -> String;

    fn create_nonce(&self, action: &str) -> String;

    fn verify_nonce(&self, nonce: &str, action: &str) -> bool;

    fn current_user_can(&self, capability: &str) -> bool;

    /// Forget the host's cached update-check state
    fn clear_update_state(&self);
}

/// Query parameters of a manual check request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManualCheckQuery {
    pub gh_check: Option<String>,
    pub nonce: Option<String>,
}

impl ManualCheckQuery {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut query, (key, value)| {
                match key {
                    "gh_check" => query.gh_check = Some(value.to_string()),
                    "nonce" => query.nonce = Some(value.to_string()),
                    _ => {}
                }
                query
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManualCheckOutcome {
    /// Not addressed to this updater, or not authorized
    Ignored,
    /// State cleared; the host should redirect here
    Redirect(String),
}

impl<S: ReleaseStorer> UpdateEvaluator<S> {
    /// Appends the "Check for updates" link to the plugin's action links
    pub fn action_links(
        &self,
        mut links: IndexMap<String, String>,
        host: &dyn AdminHost,
    ) -> IndexMap<String, String> {
        let page = host.admin_url(PLUGINS_PAGE);
        let mut url = match Url::parse(&page) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build check link from admin url {}: {}", page, e);
                return links;
            }
        };
        url.query_pairs_mut()
            .append_pair("gh_check", self.slug())
            .append_pair("nonce", &host.create_nonce(MANUAL_CHECK_ACTION));

        links.insert(
            format!("{}_check", self.slug()),
            format!(
                r#"<a href="{}">Check for updates</a>"#,
                escape_attribute(url.as_str())
            ),
        );
        links
    }

    /// Handles a manual check request.
    ///
    /// Requests for another slug, from users lacking the update capability or
    /// with a nonce that does not verify are ignored without side effects.
    pub fn handle_manual_check(
        &self,
        query: &ManualCheckQuery,
        host: &dyn AdminHost,
    ) -> ManualCheckOutcome {
        let slug = query.gh_check.as_deref().map(str::trim).unwrap_or_default();
        if slug != self.slug() {
            return ManualCheckOutcome::Ignored;
        }

        let nonce = query.nonce.as_deref().map(str::trim).unwrap_or_default();
        if !host.current_user_can(UPDATE_CAPABILITY)
            || !host.verify_nonce(nonce, MANUAL_CHECK_ACTION)
        {
            debug!("Rejected manual update check for {}", slug);
            return ManualCheckOutcome::Ignored;
        }

        host.clear_update_state();
        info!("Manual update check requested for {}", slug);

        ManualCheckOutcome::Redirect(host.admin_url(&format!("{}?gh_checked=1", PLUGINS_PAGE)))
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
