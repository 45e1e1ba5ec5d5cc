//! Per-kind job synthesis.
//!
//! Each scrape resource expands into one [`EndpointOutcome`] per declared endpoint (or target
//! group). Job names are assigned afterwards by [`number_jobs`], so that indices only count the
//! endpoints that survived credential resolution.
mod node;
mod pod;
mod probe;
mod service;
mod static_scrape;

use sc_api::{
    Endpoint,
    EndpointAuth,
    NamespaceSelector,
    ProxyAuth,
};
use sc_core::prelude::*;
use tracing::{
    debug,
    warn,
};

use crate::config::CompilerConfig;
use crate::job::{
    CompiledJob,
    ScrapeJob,
};
use crate::resolve::{
    CredentialResolver,
    ResolveError,
    ResolvedAuth,
    TlsAssets,
};

/// What became of one declared endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointOutcome {
    Compiled(Box<ScrapeJob>),
    /// Credential resolution failed on this reference.
    Dropped(CredentialRef),
}

/// An endpoint left out of the document because a credential it needs does not exist or cannot
/// be inlined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedEndpoint {
    /// `Kind namespace/name` of the owning resource.
    pub resource: String,
    /// Position of the endpoint in the resource's declaration.
    pub endpoint: usize,
    pub missing: CredentialRef,
}

/// The surviving jobs of one resource, named and indexed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceJobs {
    pub jobs: Vec<CompiledJob>,
    pub dropped: Vec<DroppedEndpoint>,
    pub tls_assets: TlsAssets,
}

/// Expand `resource` into one outcome per declared endpoint, in declaration order.
///
/// Only backing-store failures are errors; missing credentials become [`EndpointOutcome::Dropped`].
pub async fn synthesize(
    resource: &ScrapeResource,
    resolver: &mut CredentialResolver<'_>,
    config: &CompilerConfig,
) -> Result<Vec<EndpointOutcome>, StoreError> {
    let (namespace, name) = (resource.namespace(), resource.name());
    match resource {
        ScrapeResource::Service(s) => service::endpoints(namespace, &s.spec, resolver, config).await,
        ScrapeResource::Pod(p) => pod::endpoints(namespace, name, &p.spec, resolver, config).await,
        ScrapeResource::Probe(p) => probe::endpoints(namespace, &p.spec, resolver).await,
        ScrapeResource::Node(n) => node::endpoints(namespace, name, &n.spec, resolver).await,
        ScrapeResource::Static(s) => static_scrape::endpoints(namespace, &s.spec, resolver).await,
    }
}

/// Name the compiled outcomes `<tag>/<namespace>/<name>/<index>`, with indices dense over the
/// survivors, and collect the dropped ones.
pub fn number_jobs(resource: &ScrapeResource, outcomes: Vec<EndpointOutcome>) -> ResourceJobs {
    let mut result = ResourceJobs::default();

    for (position, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            EndpointOutcome::Compiled(mut job) => {
                let name = format!(
                    "{}/{}/{}/{}",
                    resource.kind().job_tag(),
                    resource.namespace(),
                    resource.name(),
                    result.jobs.len()
                );
                debug!(job = %name, "compiled scrape job");
                result.tls_assets.append(&mut job.auth.tls_assets);
                result.jobs.push(CompiledJob { name, job: *job });
            },
            EndpointOutcome::Dropped(missing) => {
                warn!(%resource, endpoint = position, %missing, "dropping endpoint with unresolvable credentials");
                result.dropped.push(DroppedEndpoint { resource: resource.to_string(), endpoint: position, missing });
            },
        }
    }

    result
}

/// Resolve an endpoint's credentials and build its job, or drop it if something is missing.
async fn compile_endpoint<F>(
    resolver: &mut CredentialResolver<'_>,
    namespace: &str,
    auth: &EndpointAuth,
    proxy: Option<&ProxyAuth>,
    build: F,
) -> Result<EndpointOutcome, StoreError>
where
    F: FnOnce(ResolvedAuth) -> ScrapeJob,
{
    match resolver.endpoint_auth(namespace, auth, proxy).await {
        Ok(resolved) => Ok(EndpointOutcome::Compiled(Box::new(build(resolved)))),
        Err(ResolveError::NotFound(missing) | ResolveError::NotUtf8(missing)) => Ok(EndpointOutcome::Dropped(missing)),
        Err(ResolveError::Store(err)) => Err(err),
    }
}

fn proxy_auth(endpoint: &Endpoint) -> Option<&ProxyAuth> {
    endpoint.vm_scrape_params.as_ref().and_then(|p| p.proxy_client_config.as_ref())
}

/// Namespaces a service or pod job discovers targets in; empty means all of them.
fn discovery_namespaces(selector: &NamespaceSelector, namespace: &str, config: &CompilerConfig) -> Vec<String> {
    if config.ignore_namespace_selectors {
        vec![namespace.into()]
    } else if selector.any {
        vec![]
    } else if !selector.match_names.is_empty() {
        selector.match_names.clone()
    } else {
        vec![namespace.into()]
    }
}

#[cfg(test)]
mod tests;
