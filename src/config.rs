use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default cache time-to-live in milliseconds (6 hours)
pub const DEFAULT_CACHE_TTL_MS: i64 = 6 * 60 * 60 * 1000;

/// Timeout for the latest-release request in milliseconds (10 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// Hosting provider defaults
// =============================================================================

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_WEB_BASE_URL: &str = "https://github.com";

/// Version reported when the host does not supply one
pub const DEFAULT_LOCAL_VERSION: &str = "1.0.0";

/// Nonce action used by the manual "check for updates" link
pub const MANUAL_CHECK_ACTION: &str = "gh_check";

/// Capability the current user needs to trigger a manual check
pub const UPDATE_CAPABILITY: &str = "update_plugins";

/// Updater configuration, read once when the evaluator is constructed
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdaterConfig {
    pub owner: String,
    pub repo: String,
    /// Main file name of the plugin (e.g. "my-plugin.php")
    pub plugin_file: Option<String>,
    /// Display name shown in plugin details
    pub plugin_name: Option<String>,
    /// Currently installed version
    pub version: String,
    /// Stable short identifier; defaults to the repository name
    pub slug: Option<String>,
    pub auth_token: Option<String>,
    /// Skip TLS certificate verification. Development only.
    pub dev_mode: bool,
    pub cache: CacheConfig,
    pub api: ApiConfig,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            plugin_file: None,
            plugin_name: None,
            version: DEFAULT_LOCAL_VERSION.to_string(),
            slug: None,
            auth_token: None,
            dev_mode: false,
            cache: CacheConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl UpdaterConfig {
    pub fn new(owner: &str, repo: &str, version: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            version: version.to_string(),
            ..Self::default()
        }
    }

    pub fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.repo)
    }

    pub fn plugin_file(&self) -> String {
        self.plugin_file
            .clone()
            .unwrap_or_else(|| format!("{}.php", self.repo))
    }

    pub fn plugin_name(&self) -> &str {
        self.plugin_name.as_deref().unwrap_or(&self.repo)
    }

    /// Host-side plugin identifier: "<slug>/<main file>"
    pub fn basename(&self) -> String {
        format!("{}/{}", self.slug(), self.plugin_file())
    }

    /// Key under which the latest release payload is cached
    pub fn cache_key(&self) -> String {
        format!("{}_updater", self.slug())
    }

    /// Token with surrounding whitespace removed; blank tokens count as absent
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache time-to-live in milliseconds
    pub ttl_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// Hosting provider endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub api_base_url: String,
    pub web_base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            web_base_url: DEFAULT_WEB_BASE_URL.to_string(),
            timeout_ms: FETCH_TIMEOUT_MS,
        }
    }
}

/// Returns the path to the data directory for release-updater.
/// Uses $XDG_DATA_HOME/release-updater if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-updater,
/// or ./release-updater if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the cache database file.
pub fn db_path() -> PathBuf {
    data_dir().join("releases.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-updater.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-updater")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn updater_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<UpdaterConfig>(json!({
            "owner": "Jared-Nolt",
            "repo": "rm-github-plugin",
            "version": "2.1.1",
            "cache": {
                "ttlMs": 1000
            }
        }))
        .unwrap();

        assert_eq!(result.cache.ttl_ms, 1000);
        assert!(result.cache.enabled);
        assert_eq!(result.api, ApiConfig::default());
        assert!(!result.dev_mode);
        assert_eq!(result.auth_token(), None);
    }

    #[test]
    fn updater_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<UpdaterConfig>(json!({
            "owner": "Jared-Nolt",
            "repo": "rm-github-plugin",
            "pluginFile": "main.php",
            "pluginName": "RM GitHub Plugin",
            "version": "2.1.1",
            "slug": "rm-plugin",
            "authToken": "secret",
            "devMode": true,
            "cache": { "enabled": false, "ttlMs": 5000 },
            "api": {
                "apiBaseUrl": "http://127.0.0.1:9000",
                "webBaseUrl": "http://127.0.0.1:9001",
                "timeoutMs": 250
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            UpdaterConfig {
                owner: "Jared-Nolt".to_string(),
                repo: "rm-github-plugin".to_string(),
                plugin_file: Some("main.php".to_string()),
                plugin_name: Some("RM GitHub Plugin".to_string()),
                version: "2.1.1".to_string(),
                slug: Some("rm-plugin".to_string()),
                auth_token: Some("secret".to_string()),
                dev_mode: true,
                cache: CacheConfig {
                    enabled: false,
                    ttl_ms: 5000
                },
                api: ApiConfig {
                    api_base_url: "http://127.0.0.1:9000".to_string(),
                    web_base_url: "http://127.0.0.1:9001".to_string(),
                    timeout_ms: 250,
                },
            }
        );
    }

    #[test]
    fn derived_names_fall_back_to_repo() {
        let config = UpdaterConfig::new("Jared-Nolt", "rm-github-plugin", "2.1.1");

        assert_eq!(config.slug(), "rm-github-plugin");
        assert_eq!(config.plugin_name(), "rm-github-plugin");
        assert_eq!(config.basename(), "rm-github-plugin/rm-github-plugin.php");
        assert_eq!(config.cache_key(), "rm-github-plugin_updater");
    }

    #[test]
    fn blank_auth_token_is_treated_as_absent() {
        let config = UpdaterConfig {
            auth_token: Some("   ".to_string()),
            ..UpdaterConfig::new("o", "r", "1.0.0")
        };

        assert_eq!(config.auth_token(), None);
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/release-updater"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(
            path,
            PathBuf::from("/home/user/.local/share/release-updater")
        );
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./release-updater"));
    }

    #[test]
    #[serial]
    fn log_path_and_db_path_share_data_dir() {
        assert_eq!(log_path().parent(), Some(data_dir().as_path()));
        assert_eq!(db_path().parent(), Some(data_dir().as_path()));
        assert_eq!(
            log_path().file_name().and_then(|name| name.to_str()),
            Some("release-updater.log")
        );
    }
}
