//! Registry trait for fetching release metadata from a hosting provider

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::RepoIdentity;

/// Trait for fetching the latest release of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseRegistry: Send + Sync {
    /// Fetches the latest release of `repo`
    ///
    /// # Returns
    /// * `Ok(String)` - The raw, non-empty response body of a 200 response
    /// * `Err(RegistryError)` - Transport failure, non-200 status or empty body
    async fn fetch_latest_release(&self, repo: &RepoIdentity) -> Result<String, RegistryError>;
}
