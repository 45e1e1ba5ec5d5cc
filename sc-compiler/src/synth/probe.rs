use std::collections::BTreeMap;

use sc_api::{
    Endpoint,
    ProbeSpec,
    ScrapeKind,
};
use sc_core::StoreError;

use super::{
    compile_endpoint,
    EndpointOutcome,
};
use crate::job::{
    Discovery,
    ScrapeJob,
};
use crate::relabel::{
    user_stages,
    RelabelStage,
};
use crate::resolve::CredentialResolver;

const DEFAULT_PROBE_PATH: &str = "/probe";

/// A probe is a single job sending every target through the prober.
pub(super) async fn endpoints(
    namespace: &str,
    spec: &ProbeSpec,
    resolver: &mut CredentialResolver<'_>,
) -> Result<Vec<EndpointOutcome>, StoreError> {
    let endpoint = prober_endpoint(spec);
    let proxy = spec.vm_scrape_params.as_ref().and_then(|p| p.proxy_client_config.as_ref());

    let outcome = compile_endpoint(resolver, namespace, &spec.auth, proxy, |auth| {
        let static_config = spec.targets.static_config.clone().unwrap_or_default();
        let discovery = Discovery::Static { targets: static_config.targets, labels: static_config.labels };
        let mut job = ScrapeJob::new(ScrapeKind::Probe, discovery, auth)
            .with_endpoint(&endpoint)
            .with_sample_limit(spec.sample_limit, None);
        job.relabel_configs = relabel_stages(spec);
        job
    })
    .await?;
    Ok(vec![outcome])
}

/// The probe's scrape settings, shaped as an endpoint pointed at the prober.
fn prober_endpoint(spec: &ProbeSpec) -> Endpoint {
    let path = spec.prober.path.clone().filter(|p| !p.is_empty()).unwrap_or_else(|| DEFAULT_PROBE_PATH.into());
    Endpoint {
        path: Some(path),
        scheme: spec.prober.scheme.clone(),
        params: BTreeMap::from([("module".to_string(), vec![spec.module.clone()])]),
        interval: spec.interval.clone(),
        scrape_timeout: spec.scrape_timeout.clone(),
        metric_relabel_configs: spec.metric_relabel_configs.clone(),
        vm_scrape_params: spec.vm_scrape_params.clone(),
        ..Default::default()
    }
}

pub(super) fn relabel_stages(spec: &ProbeSpec) -> Vec<RelabelStage> {
    let mut stages = vec![
        RelabelStage::copy("__address__", "__param_target"),
        RelabelStage::copy("__param_target", "instance"),
        RelabelStage::set("__address__", &spec.prober.url),
    ];
    if let Some(static_config) = &spec.targets.static_config {
        stages.extend(user_stages(&static_config.relabeling_configs));
    }
    stages
}
