//! GitHub Releases API registry implementation

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::version::error::RegistryError;
use crate::version::registry::ReleaseRegistry;
use crate::version::types::RepoIdentity;

/// Media type of the v3 release JSON representation
const RELEASE_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

const DEFAULT_USER_AGENT: &str = concat!("release-updater/", env!("CARGO_PKG_VERSION"));

/// Registry implementation for GitHub Releases API
pub struct GitHubRegistry {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl GitHubRegistry {
    /// Creates a GitHubRegistry with default client settings
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: &str) -> GitHubRegistryBuilder {
        GitHubRegistryBuilder {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth_token: None,
            timeout: Duration::from_millis(FETCH_TIMEOUT_MS),
            accept_invalid_certs: false,
        }
    }
}

pub struct GitHubRegistryBuilder {
    base_url: String,
    user_agent: String,
    auth_token: Option<String>,
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl GitHubRegistryBuilder {
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Token sent as `Authorization: token <token>`, needed for private repositories
    pub fn auth_token(mut self, token: Option<&str>) -> Self {
        self.auth_token = token.map(str::to_string);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification. Only for local development.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<GitHubRegistry, RegistryError> {
        if self.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for {}", self.base_url);
        }

        let client = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;

        Ok(GitHubRegistry {
            client,
            base_url: self.base_url,
            auth_token: self.auth_token,
        })
    }
}

#[async_trait::async_trait]
impl ReleaseRegistry for GitHubRegistry {
    async fn fetch_latest_release(&self, repo: &RepoIdentity) -> Result<String, RegistryError> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url,
            repo.owner(),
            repo.name()
        );
        debug!("Fetching latest release from {}", url);

        let mut request = self.client.get(&url).header(ACCEPT, RELEASE_MEDIA_TYPE);
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(repo.full_name()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status != StatusCode::OK {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(RegistryError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(RegistryError::EmptyBody);
        }

        Ok(body)
    }
}
