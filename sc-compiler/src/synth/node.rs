use sc_api::{
    NodeScrapeSpec,
    ScrapeKind,
};
use sc_core::k8s::{
    namespaced_name,
    sanitize_label_name,
};
use sc_core::StoreError;

use super::{
    compile_endpoint,
    proxy_auth,
    EndpointOutcome,
};
use crate::job::{
    Discovery,
    Role,
    ScrapeJob,
};
use crate::relabel::{
    user_stages,
    RelabelStage,
};
use crate::resolve::CredentialResolver;

/// Node scrapes have exactly one endpoint and always discover cluster-wide.
pub(super) async fn endpoints(
    namespace: &str,
    name: &str,
    spec: &NodeScrapeSpec,
    resolver: &mut CredentialResolver<'_>,
) -> Result<Vec<EndpointOutcome>, StoreError> {
    let endpoint = &spec.endpoint;
    let outcome = compile_endpoint(resolver, namespace, &endpoint.auth, proxy_auth(endpoint), |auth| {
        let discovery = Discovery::Kubernetes { role: Role::Node, namespaces: vec![] };
        let mut job = ScrapeJob::new(ScrapeKind::Node, discovery, auth)
            .with_endpoint(endpoint)
            .with_sample_limit(endpoint.sample_limit, None);
        job.relabel_configs = relabel_stages(namespace, name, spec);
        job
    })
    .await?;
    Ok(vec![outcome])
}

pub(super) fn relabel_stages(namespace: &str, name: &str, spec: &NodeScrapeSpec) -> Vec<RelabelStage> {
    let mut stages = vec![RelabelStage::copy("__meta_kubernetes_node_name", "node")];

    if let Some(port) = spec.endpoint.port.as_deref().filter(|p| !p.is_empty()) {
        stages.push(
            RelabelStage::copy("__address__", "__address__")
                .regex("^(.*):(.*)")
                .replacement(&format!("${{1}}:{port}")),
        );
    }

    stages.push(RelabelStage::set("job", &namespaced_name(namespace, name)));
    if let Some(job_label) = spec.job_label.as_deref().filter(|l| !l.is_empty()) {
        let source = format!("__meta_kubernetes_node_label_{}", sanitize_label_name(job_label));
        stages.push(RelabelStage::copy_non_empty(&source, "job"));
    }

    stages.extend(user_stages(&spec.endpoint.relabel_configs));
    stages
}
