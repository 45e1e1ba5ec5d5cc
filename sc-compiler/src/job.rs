//! The intermediate form of one scrape job, and its rendering into the agent's key order.
use std::collections::BTreeMap;

use sc_api::{
    Endpoint,
    ScrapeKind,
};

use crate::relabel::{
    user_stages,
    RelabelStage,
};
use crate::resolve::ResolvedAuth;
use crate::yaml::{
    MapSlice,
    Value,
};

/// Kubernetes service discovery roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Endpoints,
    Pod,
    Node,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Endpoints => "endpoints",
            Self::Pod => "pod",
            Self::Node => "node",
        }
    }
}

/// How the agent finds the targets of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discovery {
    /// `kubernetes_sd_configs`; an empty namespace list means all namespaces.
    Kubernetes { role: Role, namespaces: Vec<String> },
    /// `static_configs` with a single group.
    Static { targets: Vec<String>, labels: BTreeMap<String, String> },
}

impl Discovery {
    fn render(&self) -> (&'static str, Value) {
        match self {
            Self::Kubernetes { role, namespaces } => {
                let mut sd = MapSlice::new().with("role", role.as_str());
                if !namespaces.is_empty() {
                    sd.push("namespaces", MapSlice::new().with("names", namespaces.clone()));
                }
                ("kubernetes_sd_configs", vec![sd].into())
            },
            Self::Static { targets, labels } => {
                let mut group = MapSlice::new().with("targets", targets.clone());
                if !labels.is_empty() {
                    group.push("labels", labels);
                }
                ("static_configs", vec![group].into())
            },
        }
    }
}

/// Everything a compiled job carries, before it is named.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeJob {
    pub kind: ScrapeKind,
    pub discovery: Discovery,
    pub honor_labels: bool,
    pub honor_timestamps: Option<bool>,
    pub scrape_interval: Option<String>,
    pub scrape_timeout: Option<String>,
    pub params: BTreeMap<String, Vec<String>>,
    pub metrics_path: Option<String>,
    pub proxy_url: Option<String>,
    pub follow_redirects: Option<bool>,
    pub scheme: Option<String>,
    pub auth: ResolvedAuth,
    pub relabel_configs: Vec<RelabelStage>,
    pub sample_limit: Option<u64>,
    pub metric_relabel_configs: Vec<RelabelStage>,
    pub scrape_offset: Option<String>,
    pub scrape_align_interval: Option<String>,
    pub stream_parse: Option<bool>,
    pub disable_compression: Option<bool>,
    pub disable_keep_alive: Option<bool>,
    pub headers: Vec<String>,
}

impl ScrapeJob {
    pub fn new(kind: ScrapeKind, discovery: Discovery, auth: ResolvedAuth) -> Self {
        Self {
            kind,
            discovery,
            honor_labels: false,
            honor_timestamps: None,
            scrape_interval: None,
            scrape_timeout: None,
            params: BTreeMap::new(),
            metrics_path: None,
            proxy_url: None,
            follow_redirects: None,
            scheme: None,
            auth,
            relabel_configs: vec![],
            sample_limit: None,
            metric_relabel_configs: vec![],
            scrape_offset: None,
            scrape_align_interval: None,
            stream_parse: None,
            disable_compression: None,
            disable_keep_alive: None,
            headers: vec![],
        }
    }

    /// Copy the connection settings of `endpoint`. Relabeling and credentials are handled by the
    /// caller.
    pub fn with_endpoint(mut self, endpoint: &Endpoint) -> Self {
        self.honor_labels = endpoint.honor_labels;
        self.honor_timestamps = endpoint.honor_timestamps;
        self.scrape_interval = non_empty(&endpoint.interval);
        self.scrape_timeout = non_empty(&endpoint.scrape_timeout);
        self.params = endpoint.params.clone();
        self.metrics_path = non_empty(&endpoint.path);
        self.proxy_url = non_empty(&endpoint.proxy_url);
        self.follow_redirects = endpoint.follow_redirects;
        self.scheme = non_empty(&endpoint.scheme);
        self.metric_relabel_configs = user_stages(&endpoint.metric_relabel_configs);

        if let Some(vm) = &endpoint.vm_scrape_params {
            self.scrape_offset = non_empty(&vm.scrape_offset);
            self.scrape_align_interval = non_empty(&vm.scrape_align_interval);
            self.stream_parse = vm.stream_parse;
            self.disable_compression = vm.disable_compression;
            self.disable_keep_alive = vm.disable_keep_alive;
            self.headers = vm.headers.clone();
        }
        self
    }

    /// The endpoint's own limit wins over the resource-wide one; zero means unlimited.
    pub fn with_sample_limit(mut self, endpoint: Option<u64>, resource: Option<u64>) -> Self {
        self.sample_limit = endpoint.filter(|l| *l > 0).or(resource.filter(|l| *l > 0));
        self
    }

    pub fn render(&self, job_name: &str) -> MapSlice {
        let mut m = MapSlice::new();
        m.push("job_name", job_name);
        if self.kind != ScrapeKind::Probe {
            m.push("honor_labels", self.honor_labels);
        }
        m.push_opt("honor_timestamps", self.honor_timestamps);

        let (discovery_key, discovery) = self.discovery.render();
        if self.kind != ScrapeKind::Probe {
            m.push(discovery_key, discovery.clone());
        }

        m.push_opt("scrape_interval", self.scrape_interval.as_ref());
        m.push_opt("scrape_timeout", self.scrape_timeout.as_ref());
        if !self.params.is_empty() {
            m.push("params", &self.params);
        }
        m.push_opt("metrics_path", self.metrics_path.as_ref());
        if self.kind == ScrapeKind::Probe {
            m.push(discovery_key, discovery);
        }
        m.push_opt("proxy_url", self.proxy_url.as_ref());
        m.push_opt("follow_redirects", self.follow_redirects);
        m.push_opt("scheme", self.scheme.as_ref());

        let auth = &self.auth;
        m.push_opt("tls_config", auth.tls_config.clone());
        m.push_opt("bearer_token_file", auth.bearer_token_file.as_ref());
        m.push_opt("bearer_token", auth.bearer_token.as_ref());
        m.push_opt("basic_auth", auth.basic_auth.clone());

        m.push("relabel_configs", self.relabel_configs.clone());
        m.push_opt("sample_limit", self.sample_limit);
        if !self.metric_relabel_configs.is_empty() {
            m.push("metric_relabel_configs", self.metric_relabel_configs.clone());
        }

        m.push_opt("scrape_offset", self.scrape_offset.as_ref());
        m.push_opt("scrape_align_interval", self.scrape_align_interval.as_ref());
        m.push_opt("stream_parse", self.stream_parse);
        m.push_opt("disable_compression", self.disable_compression);
        m.push_opt("disable_keep_alive", self.disable_keep_alive);
        if !self.headers.is_empty() {
            m.push("headers", self.headers.clone());
        }

        m.push_opt("proxy_basic_auth", auth.proxy_basic_auth.clone());
        m.push_opt("proxy_tls_config", auth.proxy_tls_config.clone());
        m.push_opt("proxy_bearer_token", auth.proxy_bearer_token.as_ref());
        m.push_opt("proxy_bearer_token_file", auth.proxy_bearer_token_file.as_ref());
        m.push_opt("oauth2", auth.oauth2.clone());
        m
    }
}

/// A job that survived compilation, with its final name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledJob {
    pub name: String,
    pub job: ScrapeJob,
}

impl CompiledJob {
    pub fn to_map_slice(&self) -> MapSlice {
        self.job.render(&self.name)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
