//! Release data shared by the fetcher, the cache and the evaluator

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

use crate::version::semver::strip_tag_prefix;

/// Owner and name of the upstream repository. Fixed for the lifetime of an updater.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentity {
    owner: String,
    name: String,
}

impl RepoIdentity {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// "owner/name", as used in API paths
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Fields consumed from the "latest release" response body
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ReleasePayload {
    #[serde(default)]
    pub tag_name: Option<String>,
    /// Unparseable timestamps are dropped rather than rejecting the release
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub body: Option<String>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc)))
}

/// Latest release of the upstream repository
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseInfo {
    pub tag_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub body: Option<String>,
    /// Source archive for `tag_name`; empty when the release has no tag
    pub zip_download_url: String,
}

impl ReleaseInfo {
    /// Parse a raw response body into release info for `repo`.
    pub fn from_body(
        body: &str,
        repo: &RepoIdentity,
        web_base_url: &str,
    ) -> Result<Self, serde_json::Error> {
        let payload: ReleasePayload = serde_json::from_str(body)?;
        Ok(Self::from_payload(payload, repo, web_base_url))
    }

    pub fn from_payload(
        payload: ReleasePayload,
        repo: &RepoIdentity,
        web_base_url: &str,
    ) -> Self {
        let tag_name = payload.tag_name.filter(|tag| !tag.is_empty());
        let zip_download_url = tag_name
            .as_deref()
            .map(|tag| archive_url(web_base_url, repo, tag))
            .unwrap_or_default();

        Self {
            tag_name,
            published_at: payload.published_at,
            body: payload.body,
            zip_download_url,
        }
    }

    /// Tag with any leading "v"/"V" removed
    pub fn version(&self) -> Option<&str> {
        self.tag_name.as_deref().map(strip_tag_prefix)
    }

    /// Publish time formatted as RFC 3339, or empty when unknown
    pub fn last_updated(&self) -> String {
        self.published_at
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default()
    }
}

/// `<web>/<owner>/<name>/archive/refs/tags/<tag>.zip`
pub fn archive_url(web_base_url: &str, repo: &RepoIdentity, tag: &str) -> String {
    format!(
        "{}/{}/{}/archive/refs/tags/{}.zip",
        web_base_url.trim_end_matches('/'),
        repo.owner(),
        repo.name(),
        tag
    )
}
