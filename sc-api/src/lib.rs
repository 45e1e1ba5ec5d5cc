#![warn(
    // Noisy on purpose: findings get fixed or get an inline allow that a reviewer can see.
    clippy::nursery,
    clippy::pedantic,
)]

//! Custom resource definitions for the five scrape intent kinds understood by scrapeconf.
//!
//! Every kind is a namespaced custom resource in the `monitoring.scrapeconf.dev/v1beta1` group.
//! The types in here are plain data: they are read from the cluster by an external lister and
//! handed to the compiler as an immutable snapshot.

pub mod auth;
pub mod endpoint;
pub mod relabel;
pub mod scrape;

pub use auth::{
    BasicAuth,
    ConfigMapKeyRef,
    OAuth2,
    ProxyAuth,
    SecretKeyRef,
    SecretOrConfigMap,
    TlsConfig,
};
pub use endpoint::{
    Endpoint,
    EndpointAuth,
    NamespaceSelector,
    ScrapeParams,
    TargetEndpoint,
};
pub use relabel::RelabelRule;
pub use scrape::{
    NodeScrape,
    NodeScrapeSpec,
    PodScrape,
    PodScrapeSpec,
    Probe,
    ProbeSpec,
    ProbeStaticConfig,
    ProbeTargets,
    ProberSpec,
    ScrapeKind,
    ScrapeResource,
    ServiceScrape,
    ServiceScrapeSpec,
    StaticScrape,
    StaticScrapeSpec,
};

/// API group shared by every scrape resource.
pub const API_GROUP: &str = "monitoring.scrapeconf.dev";
