//! Typed records exchanged with the host application

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Result of a host filter: either leave the host's value alone or replace it
#[derive(Debug, Clone, PartialEq)]
pub enum Filtered<T> {
    Passthrough,
    Replace(T),
}

impl<T> Filtered<T> {
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Filtered::Passthrough)
    }
}

/// Plugin details shown in the host's "view details" dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub author: String,
    pub homepage: String,
    pub download_link: String,
    pub trunk: String,
    pub last_updated: String,
    pub sections: Sections,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub description: String,
    pub installation: String,
    pub changelog: String,
}

/// Offer of a newer version, injected into the host's update list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub slug: String,
    /// Host-side plugin identifier ("<slug>/<main file>")
    pub plugin: String,
    pub new_version: String,
    pub package: String,
}

/// The host's cached update-check state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTransient {
    /// Installed versions keyed by plugin identifier, filled by the host's
    /// own check pass. Empty until that pass has run.
    pub checked: IndexMap<String, String>,
    /// Available updates keyed by plugin identifier
    pub response: IndexMap<String, UpdateRecord>,
}

impl UpdateTransient {
    pub fn has_been_checked(&self) -> bool {
        !self.checked.is_empty()
    }
}

/// Options describing a finished upgrader run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeOptions {
    pub action: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl UpgradeOptions {
    pub fn new(action: &str, kind: &str) -> Self {
        Self {
            action: action.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn is_plugin_update(&self) -> bool {
        self.action == "update" && self.kind == "plugin"
    }
}

/// Arguments of an outbound HTTP request made by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestArgs {
    pub headers: IndexMap<String, String>,
}

impl RequestArgs {
    /// Looks up a header ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing one of the same name
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value);
    }
}
