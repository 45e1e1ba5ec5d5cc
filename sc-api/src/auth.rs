//! Credential shapes that an endpoint may carry.
//!
//! None of these hold secret material directly; they point at keys inside Secrets or ConfigMaps
//! living in the same namespace as the scrape resource.
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

/// Selects a key of a Secret in the resource's namespace.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SecretKeyRef {
    /// Name of the Secret.
    pub name: String,
    /// Key within the Secret's data.
    pub key: String,
}

impl SecretKeyRef {
    pub fn new(name: &str, key: &str) -> Self {
        Self { name: name.into(), key: key.into() }
    }
}

/// Selects a key of a ConfigMap in the resource's namespace.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigMapKeyRef {
    /// Name of the ConfigMap.
    pub name: String,
    /// Key within the ConfigMap's data.
    pub key: String,
}

/// A value that can come from either a Secret or a ConfigMap key.
///
/// When both are set the Secret wins.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretOrConfigMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretKeyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapKeyRef>,
}

impl SecretOrConfigMap {
    pub fn from_secret(name: &str, key: &str) -> Self {
        Self { secret: Some(SecretKeyRef::new(name, key)), config_map: None }
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_none() && self.config_map.is_none()
    }
}

/// HTTP basic authentication.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuth {
    pub username: SecretKeyRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretKeyRef>,
    /// Path to a password file mounted into the agent; used when `password` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,
}

/// OAuth2 client credentials flow.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2 {
    #[serde(rename = "client_id")]
    pub client_id: SecretOrConfigMap,
    #[serde(rename = "client_secret", default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretKeyRef>,
    #[serde(rename = "client_secret_file", default, skip_serializing_if = "Option::is_none")]
    pub client_secret_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(rename = "endpoint_params", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoint_params: BTreeMap<String, String>,
    #[serde(rename = "token_url")]
    pub token_url: String,
}

/// TLS settings for talking to a target (or to a proxy in front of it).
///
/// CA and certificate may come from an inline file path, a Secret or a ConfigMap; the private key
/// from an inline file path or a Secret. Inline paths take precedence over references.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<String>,
    #[serde(default, skip_serializing_if = "SecretOrConfigMap::is_empty")]
    pub ca: SecretOrConfigMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    #[serde(default, skip_serializing_if = "SecretOrConfigMap::is_empty")]
    pub cert: SecretOrConfigMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<SecretKeyRef>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// Credentials presented to an HTTP proxy sitting between the agent and the target.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAuth {
    #[serde(rename = "basic_auth", default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    #[serde(rename = "bearer_token", default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<SecretKeyRef>,
    #[serde(rename = "bearer_token_file", default, skip_serializing_if = "Option::is_none")]
    pub bearer_token_file: Option<String>,
    #[serde(rename = "tls_config", default, skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
}
