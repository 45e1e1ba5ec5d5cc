//! The narrow interfaces the compiler consumes: a lister for candidate scrape resources, a store
//! for credential material, and a persister for the compiled document.
mod kube_store;
mod memory;

use std::fmt;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use sc_api::{
    ConfigMapKeyRef,
    ScrapeKind,
    ScrapeResource,
    SecretKeyRef,
    SecretOrConfigMap,
};

pub use self::kube_store::KubeCredentialStore;
pub use self::memory::{
    InMemoryCredentialStore,
    InMemoryLister,
    InMemoryPersister,
};
use crate::errors::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKind {
    Secret,
    ConfigMap,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret => write!(f, "secret"),
            Self::ConfigMap => write!(f, "configmap"),
        }
    }
}

/// Points at one key of one Secret or ConfigMap.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CredentialRef {
    pub kind: CredentialKind,
    pub namespace: String,
    pub name: String,
    pub key: String,
}

impl CredentialRef {
    pub fn secret(namespace: &str, selector: &SecretKeyRef) -> Self {
        Self {
            kind: CredentialKind::Secret,
            namespace: namespace.into(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        }
    }

    pub fn config_map(namespace: &str, selector: &ConfigMapKeyRef) -> Self {
        Self {
            kind: CredentialKind::ConfigMap,
            namespace: namespace.into(),
            name: selector.name.clone(),
            key: selector.key.clone(),
        }
    }

    /// The Secret side wins when both are set; `None` when neither is.
    pub fn from_secret_or_config_map(namespace: &str, source: &SecretOrConfigMap) -> Option<Self> {
        match (&source.secret, &source.config_map) {
            (Some(secret), _) => Some(Self::secret(namespace, secret)),
            (None, Some(cm)) => Some(Self::config_map(namespace, cm)),
            (None, None) => None,
        }
    }

    /// File name the referenced material is mounted under: `<namespace>_<name>_<key>`.
    pub fn asset_name(&self) -> String {
        format!("{}_{}_{}", self.namespace, self.name, self.key)
    }
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{} key {}", self.kind, self.namespace, self.name, self.key)
    }
}

/// The agent instance a compiled document belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentRef {
    pub namespace: String,
    pub name: String,
}

impl AgentRef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Object and namespace selectors for one scrape kind; interpreted only by the lister.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KindSelectors {
    pub selector: Option<LabelSelector>,
    pub namespace_selector: Option<LabelSelector>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrapeSelectors {
    pub service: KindSelectors,
    pub pod: KindSelectors,
    pub probe: KindSelectors,
    pub node: KindSelectors,
    pub static_scrape: KindSelectors,
}

impl ScrapeSelectors {
    pub fn for_kind(&self, kind: ScrapeKind) -> &KindSelectors {
        match kind {
            ScrapeKind::Service => &self.service,
            ScrapeKind::Pod => &self.pod,
            ScrapeKind::Probe => &self.probe,
            ScrapeKind::Node => &self.node,
            ScrapeKind::Static => &self.static_scrape,
        }
    }
}

/// Supplies the already-selected candidate resources of one kind, in any order.
#[async_trait]
pub trait ScrapeLister: Send + Sync {
    async fn list(&self, kind: ScrapeKind, selectors: &KindSelectors) -> Result<Vec<ScrapeResource>, StoreError>;
}

/// Looks up credential material.
///
/// A missing object or a missing key is `Ok(None)`; only transport or backend failures are
/// errors.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, reference: &CredentialRef) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Stores the serialized document for an agent. Encoding (compression, wrapping object) is up
/// to the implementation.
#[async_trait]
pub trait ConfigPersister: Send + Sync {
    async fn save(&self, owner: &AgentRef, document: &[u8]) -> Result<(), StoreError>;
}
