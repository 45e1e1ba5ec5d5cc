use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use sc_api::{
    Endpoint,
    ScrapeKind,
    ServiceScrapeSpec,
};
use sc_core::k8s::sanitize_label_name;
use sc_core::StoreError;

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

const TARGET_KIND: &str = "__meta_kubernetes_endpoint_address_target_kind";
const TARGET_NAME: &str = "__meta_kubernetes_endpoint_address_target_name";

pub(super) async fn endpoints(
    namespace: &str,
    spec: &ServiceScrapeSpec,
    resolver: &mut CredentialResolver<'_>,
    config: &CompilerConfig,
) -> Result<Vec<EndpointOutcome>, StoreError> {
    let mut outcomes = Vec::with_capacity(spec.endpoints.len());
    for endpoint in &spec.endpoints {
        let outcome = compile_endpoint(resolver, namespace, &endpoint.auth, proxy_auth(endpoint), |auth| {
            let discovery = Discovery::Kubernetes {
                role: Role::Endpoints,
                namespaces: discovery_namespaces(&spec.namespace_selector, namespace, config),
            };
            let mut job = ScrapeJob::new(ScrapeKind::Service, discovery, auth)
                .with_endpoint(endpoint)
                .with_sample_limit(endpoint.sample_limit, spec.sample_limit);
            job.relabel_configs = relabel_stages(spec, endpoint);
            job
        })
        .await?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

pub(super) fn relabel_stages(spec: &ServiceScrapeSpec, endpoint: &Endpoint) -> Vec<RelabelStage> {
    let mut stages = vec![];

    let port = endpoint.port.as_deref().filter(|p| !p.is_empty());
    if let Some(port) = port {
        stages.push(RelabelStage::keep("__meta_kubernetes_endpoint_port_name", port));
    } else if let Some(target_port) = &endpoint.target_port {
        stages.push(match target_port {
            IntOrString::Int(n) => RelabelStage::keep("__meta_kubernetes_pod_container_port_number", &n.to_string()),
            IntOrString::String(name) => RelabelStage::keep("__meta_kubernetes_pod_container_port_name", name),
        });
    }

    // Address targets backed by nodes or pods get the matching label.
    for (kind, target) in [("Node", "node"), ("Pod", "pod")] {
        stages.push(
            RelabelStage::new()
                .source_labels([TARGET_KIND, TARGET_NAME])
                .separator(";")
                .regex(&format!("{kind};(.*)"))
                .replacement("${1}")
                .target_label(target),
        );
    }

    stages.push(RelabelStage::copy("__meta_kubernetes_pod_name", "pod"));
    stages.push(RelabelStage::copy("__meta_kubernetes_pod_container_name", "container"));
    stages.push(RelabelStage::copy("__meta_kubernetes_namespace", "namespace"));
    stages.push(RelabelStage::copy("__meta_kubernetes_service_name", "service"));

    for label in &spec.target_labels {
        let label = sanitize_label_name(label);
        stages.push(RelabelStage::copy_non_empty(&format!("__meta_kubernetes_service_label_{label}"), &label));
    }
    for label in &spec.pod_target_labels {
        let label = sanitize_label_name(label);
        stages.push(RelabelStage::copy_non_empty(&format!("__meta_kubernetes_pod_label_{label}"), &label));
    }

    stages.push(RelabelStage::copy("__meta_kubernetes_service_name", "job").replacement("${1}"));
    if let Some(job_label) = spec.job_label.as_deref().filter(|l| !l.is_empty()) {
        let source = format!("__meta_kubernetes_service_label_{}", sanitize_label_name(job_label));
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

pub(super) fn int_or_string(value: &IntOrString) -> String {
    match value {
        IntOrString::Int(n) => n.to_string(),
        IntOrString::String(s) => s.clone(),
    }
}
