use derive_setters::Setters;
use serde::{
    Deserialize,
    Serialize,
};

pub const DEFAULT_SCRAPE_INTERVAL: &str = "30s";
pub const DEFAULT_TLS_ASSETS_DIR: &str = "/etc/vmagent-tls/certs";
pub const DEFAULT_EXTERNAL_LABEL_NAME: &str = "prometheus";

/// Knobs of the compilation that are not part of any scrape resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Setters)]
#[serde(rename_all = "camelCase", default)]
#[setters(into)]
pub struct CompilerConfig {
    /// Global scrape interval, used by every job that does not declare its own.
    pub scrape_interval: String,

    /// Where the agent mounts TLS material referenced by scrape resources.
    pub tls_assets_dir: String,

    /// Name of the external label identifying the agent; its value is `<namespace>/<name>`.
    pub external_label_name: String,

    /// Discover targets only in each resource's own namespace, whatever its namespace selector
    /// says.
    pub ignore_namespace_selectors: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            scrape_interval: DEFAULT_SCRAPE_INTERVAL.into(),
            tls_assets_dir: DEFAULT_TLS_ASSETS_DIR.into(),
            external_label_name: DEFAULT_EXTERNAL_LABEL_NAME.into(),
            ignore_namespace_selectors: false,
        }
    }
}

impl CompilerConfig {
    /// Parse a config document; missing fields take their defaults.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}
