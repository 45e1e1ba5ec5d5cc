use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use sc_api::{
    Endpoint,
    PodScrapeSpec,
    ScrapeKind,
};
use sc_core::k8s::{
    namespaced_name,
    sanitize_label_name,
};
use sc_core::StoreError;

use super::service::int_or_string;
use super::{
    compile_endpoint,
    discovery_namespaces,
    proxy_auth,
    EndpointOutcome,
};
use crate::config::CompilerConfig;
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
use crate::selector::selector_stages;

pub(super) async fn endpoints(
    namespace: &str,
    name: &str,
    spec: &PodScrapeSpec,
    resolver: &mut CredentialResolver<'_>,
    config: &CompilerConfig,
) -> Result<Vec<EndpointOutcome>, StoreError> {
    let mut outcomes = Vec::with_capacity(spec.pod_metrics_endpoints.len());
    for endpoint in &spec.pod_metrics_endpoints {
        let outcome = compile_endpoint(resolver, namespace, &endpoint.auth, proxy_auth(endpoint), |auth| {
            let discovery = Discovery::Kubernetes {
                role: Role::Pod,
                namespaces: discovery_namespaces(&spec.namespace_selector, namespace, config),
            };
            let mut job = ScrapeJob::new(ScrapeKind::Pod, discovery, auth)
                .with_endpoint(endpoint)
                .with_sample_limit(endpoint.sample_limit, spec.sample_limit);
            job.relabel_configs = relabel_stages(namespace, name, spec, endpoint);
            job
        })
        .await?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

pub(super) fn relabel_stages(
    namespace: &str,
    name: &str,
    spec: &PodScrapeSpec,
    endpoint: &Endpoint,
) -> Vec<RelabelStage> {
    let mut stages = vec![RelabelStage::drop("__meta_kubernetes_pod_phase", "(Failed|Succeeded)")];
    stages.extend(selector_stages(&spec.selector, "pod"));

    let port = endpoint.port.as_deref().filter(|p| !p.is_empty());
    if let Some(port) = port {
        stages.push(RelabelStage::keep("__meta_kubernetes_pod_container_port_name", port));
    } else if let Some(target_port) = &endpoint.target_port {
        stages.push(match target_port {
            IntOrString::Int(n) => RelabelStage::keep("__meta_kubernetes_pod_container_port_number", &n.to_string()),
            IntOrString::String(port_name) => RelabelStage::keep("__meta_kubernetes_pod_container_port_name", port_name),
        });
    }

    stages.push(RelabelStage::copy("__meta_kubernetes_namespace", "namespace"));
    stages.push(RelabelStage::copy("__meta_kubernetes_pod_container_name", "container"));
    stages.push(RelabelStage::copy("__meta_kubernetes_pod_name", "pod"));

    for label in &spec.pod_target_labels {
        let label = sanitize_label_name(label);
        stages.push(RelabelStage::copy_non_empty(&format!("__meta_kubernetes_pod_label_{label}"), &label));
    }

    stages.push(RelabelStage::set("job", &namespaced_name(namespace, name)));
    if let Some(job_label) = spec.job_label.as_deref().filter(|l| !l.is_empty()) {
        let source = format!("__meta_kubernetes_pod_label_{}", sanitize_label_name(job_label));
        stages.push(RelabelStage::copy_non_empty(&source, "job"));
    }

    if let Some(port) = port {
        stages.push(RelabelStage::set("endpoint", port));
    } else if let Some(target_port) = &endpoint.target_port {
        stages.push(RelabelStage::set("endpoint", &int_or_string(target_port)));
    }

    stages.extend(user_stages(&endpoint.relabel_configs));
    stages
}
