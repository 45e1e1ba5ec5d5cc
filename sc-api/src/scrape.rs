//! The scrape resource kinds themselves.
use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    LabelSelector,
    ObjectMeta,
};
use kube::{
    CustomResource,
    Resource,
};
use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

use crate::endpoint::{
    Endpoint,
    EndpointAuth,
    NamespaceSelector,
    ScrapeParams,
    TargetEndpoint,
};
use crate::relabel::RelabelRule;

/// Scrapes the endpoints backing a Service.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "monitoring.scrapeconf.dev", version = "v1beta1", kind = "ServiceScrape", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ServiceScrapeSpec {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Service label whose value becomes the `job` label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_label: Option<String>,
    /// Service labels copied onto every target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_labels: Vec<String>,
    /// Pod labels copied onto every target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pod_target_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u64>,
    #[serde(default)]
    pub namespace_selector: NamespaceSelector,
    /// Used by the lister to pick Services; the compiler does not consult it.
    #[serde(default)]
    pub selector: LabelSelector,
}

/// Scrapes pods directly.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "monitoring.scrapeconf.dev", version = "v1beta1", kind = "PodScrape", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PodScrapeSpec {
    #[serde(default)]
    pub pod_metrics_endpoints: Vec<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pod_target_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u64>,
    #[serde(default)]
    pub namespace_selector: NamespaceSelector,
    /// Pods to keep. Translated into relabel stages rather than evaluated in-cluster.
    #[serde(default)]
    pub selector: LabelSelector,
}

/// Scrapes every cluster node through a single endpoint definition.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "monitoring.scrapeconf.dev", version = "v1beta1", kind = "NodeScrape", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct NodeScrapeSpec {
    #[serde(flatten)]
    pub endpoint: Endpoint,
    /// Node label whose value becomes the `job` label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_label: Option<String>,
}

/// Scrapes a fixed list of addresses.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "monitoring.scrapeconf.dev", version = "v1beta1", kind = "StaticScrape", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct StaticScrapeSpec {
    #[serde(default)]
    pub target_endpoints: Vec<TargetEndpoint>,
    /// Fixed value for the `job` label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u64>,
}

/// Where probe requests are sent.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProberSpec {
    /// `host:port` of the prober.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Defaults to `/probe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeStaticConfig {
    #[serde(rename = "static", default)]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relabeling_configs: Vec<RelabelRule>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_config: Option<ProbeStaticConfig>,
}

/// Probes a set of targets through an external prober (blackbox-exporter style).
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "monitoring.scrapeconf.dev", version = "v1beta1", kind = "Probe", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    /// Prober module to use; sent as the `module` URL parameter.
    #[serde(default)]
    pub module: String,
    #[serde(rename = "vmProberSpec")]
    pub prober: ProberSpec,
    #[serde(default)]
    pub targets: ProbeTargets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<u64>,
    #[serde(flatten)]
    pub auth: EndpointAuth,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_relabel_configs: Vec<RelabelRule>,
    #[serde(rename = "vm_scrape_params", default, skip_serializing_if = "Option::is_none")]
    pub vm_scrape_params: Option<ScrapeParams>,
}

/// The five scrape kinds, declared in compilation priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScrapeKind {
    Service,
    Pod,
    Probe,
    Node,
    Static,
}

impl ScrapeKind {
    /// Every kind, in the order jobs appear in a compiled document.
    pub const ALL: [ScrapeKind; 5] = [Self::Service, Self::Pod, Self::Probe, Self::Node, Self::Static];

    /// Prefix used in generated job names.
    pub fn job_tag(self) -> &'static str {
        match self {
            Self::Service => "serviceScrape",
            Self::Pod => "podScrape",
            Self::Probe => "probe",
            Self::Node => "nodeScrape",
            Self::Static => "staticScrape",
        }
    }
}

impl fmt::Display for ScrapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Service => "ServiceScrape",
            Self::Pod => "PodScrape",
            Self::Probe => "Probe",
            Self::Node => "NodeScrape",
            Self::Static => "StaticScrape",
        };
        write!(f, "{kind}")
    }
}

/// Any one of the scrape resources, as handed over by a lister.
#[derive(Clone, Debug)]
pub enum ScrapeResource {
    Service(ServiceScrape),
    Pod(PodScrape),
    Probe(Probe),
    Node(NodeScrape),
    Static(StaticScrape),
}

impl ScrapeResource {
    pub fn kind(&self) -> ScrapeKind {
        match self {
            Self::Service(_) => ScrapeKind::Service,
            Self::Pod(_) => ScrapeKind::Pod,
            Self::Probe(_) => ScrapeKind::Probe,
            Self::Node(_) => ScrapeKind::Node,
            Self::Static(_) => ScrapeKind::Static,
        }
    }

    fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Service(r) => r.meta(),
            Self::Pod(r) => r.meta(),
            Self::Probe(r) => r.meta(),
            Self::Node(r) => r.meta(),
            Self::Static(r) => r.meta(),
        }
    }

    /// Namespace of the resource; empty for objects that were never namespaced.
    pub fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    /// `(kind, namespace, name)`: the order resources are compiled in.
    pub fn sort_key(&self) -> (ScrapeKind, &str, &str) {
        (self.kind(), self.namespace(), self.name())
    }
}

impl fmt::Display for ScrapeResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind(), self.namespace(), self.name())
    }
}

impl From<ServiceScrape> for ScrapeResource {
    fn from(value: ServiceScrape) -> Self {
        Self::Service(value)
    }
}

impl From<PodScrape> for ScrapeResource {
    fn from(value: PodScrape) -> Self {
        Self::Pod(value)
    }
}

impl From<Probe> for ScrapeResource {
    fn from(value: Probe) -> Self {
        Self::Probe(value)
    }
}

impl From<NodeScrape> for ScrapeResource {
    fn from(value: NodeScrape) -> Self {
        Self::Node(value)
    }
}

impl From<StaticScrape> for ScrapeResource {
    fn from(value: StaticScrape) -> Self {
        Self::Static(value)
    }
}
