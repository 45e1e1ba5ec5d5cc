use sc_api::{
    ScrapeKind,
    StaticScrapeSpec,
    TargetEndpoint,
};
use sc_core::StoreError;

use super::{
    compile_endpoint,
    proxy_auth,
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

/// One job per target group. The declared `port` is not used: targets already carry theirs.
pub(super) async fn endpoints(
    namespace: &str,
    spec: &StaticScrapeSpec,
    resolver: &mut CredentialResolver<'_>,
) -> Result<Vec<EndpointOutcome>, StoreError> {
    let mut outcomes = Vec::with_capacity(spec.target_endpoints.len());
    for target in &spec.target_endpoints {
        let endpoint = &target.endpoint;
        let outcome = compile_endpoint(resolver, namespace, &endpoint.auth, proxy_auth(endpoint), |auth| {
            let discovery = Discovery::Static { targets: target.targets.clone(), labels: target.labels.clone() };
            let mut job = ScrapeJob::new(ScrapeKind::Static, discovery, auth)
                .with_endpoint(endpoint)
                .with_sample_limit(endpoint.sample_limit, spec.sample_limit);
            job.relabel_configs = relabel_stages(spec, target);
            job
        })
        .await?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

pub(super) fn relabel_stages(spec: &StaticScrapeSpec, target: &TargetEndpoint) -> Vec<RelabelStage> {
    let mut stages = vec![];
    if let Some(job_name) = spec.job_name.as_deref().filter(|j| !j.is_empty()) {
        stages.push(RelabelStage::set("job", job_name));
    }
    stages.extend(user_stages(&target.endpoint.relabel_configs));
    stages
}
