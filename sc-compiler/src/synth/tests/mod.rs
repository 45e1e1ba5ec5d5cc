use std::collections::BTreeMap;

use assertables::{
    assert_contains,
    assert_not_contains,
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use rstest::*;
use sc_api::{
    Endpoint,
    NodeScrapeSpec,
    PodScrapeSpec,
    ProbeSpec,
    ProbeStaticConfig,
    ProbeTargets,
    ProberSpec,
    RelabelRule,
    SecretKeyRef,
    ServiceScrapeSpec,
    StaticScrapeSpec,
    TargetEndpoint,
};
use sc_core::store::InMemoryCredentialStore;
use sc_core::testutils::*;

use super::*;
use crate::job::Discovery;
use crate::relabel::RelabelStage;

fn yaml(stages: Vec<RelabelStage>) -> String {
    serde_yaml::to_string(&crate::yaml::Value::from(stages)).unwrap()
}

fn user_rule(action: &str, source: &str) -> RelabelRule {
    RelabelRule { action: Some(action.into()), source_labels: vec![source.into()], ..Default::default() }
}

#[rstest]
fn test_service_stages_target_port_and_labels() {
    let spec = ServiceScrapeSpec {
        target_labels: vec!["app.kubernetes.io/name".into()],
        pod_target_labels: vec!["team".into()],
        ..Default::default()
    };
    let endpoint = Endpoint {
        target_port: Some(IntOrString::Int(9100)),
        relabel_configs: vec![user_rule("drop", "__meta_kubernetes_pod_label_canary")],
        ..Default::default()
    };

    let rendered = yaml(service::relabel_stages(&spec, &endpoint));

    assert_contains!(rendered, "- action: keep\n  source_labels:\n  - __meta_kubernetes_pod_container_port_number\n  regex: '9100'\n");
    assert_contains!(
        rendered,
        "- source_labels:\n  - __meta_kubernetes_service_label_app_kubernetes_io_name\n  target_label: \
         app_kubernetes_io_name\n  regex: (.+)\n  replacement: ${1}\n"
    );
    assert_contains!(rendered, "- __meta_kubernetes_pod_label_team\n  target_label: team\n");
    assert_contains!(rendered, "- target_label: endpoint\n  replacement: '9100'\n");
    assert_not_contains!(rendered, "__meta_kubernetes_service_label_app\n");
    assert!(rendered.ends_with("- source_labels:\n  - __meta_kubernetes_pod_label_canary\n  action: drop\n"));
}

#[rstest]
fn test_pod_stages_named_target_port() {
    let spec = PodScrapeSpec::default();
    let endpoint = Endpoint { target_port: Some(IntOrString::String("metrics".into())), ..Default::default() };

    let stages = pod::relabel_stages("default", "api", &spec, &endpoint);

    // phase drop, port keep, three copies, job, endpoint
    assert_eq!(stages.len(), 7);
    assert_eq!(stages[1], RelabelStage::keep("__meta_kubernetes_pod_container_port_name", "metrics"));
    assert_eq!(stages[5], RelabelStage::set("job", "default/api"));
    assert_eq!(stages[6], RelabelStage::set("endpoint", "metrics"));
}

#[rstest]
fn test_node_stages_port_rewrite_and_job_label() {
    let spec = NodeScrapeSpec { endpoint: endpoint("9100", "/metrics"), job_label: Some("kubernetes.io/role".into()) };

    let rendered = yaml(node::relabel_stages("default", "nodes", &spec));

    assert_eq!(
        rendered,
        "- source_labels:
  - __meta_kubernetes_node_name
  target_label: node
- source_labels:
  - __address__
  target_label: __address__
  regex: ^(.*):(.*)
  replacement: ${1}:9100
- target_label: job
  replacement: default/nodes
- source_labels:
  - __meta_kubernetes_node_label_kubernetes_io_role
  target_label: job
  regex: (.+)
  replacement: ${1}
"
    );
}

#[rstest]
fn test_static_stages() {
    let target = TargetEndpoint { targets: vec!["10.0.0.1:9100".into()], ..Default::default() };

    assert!(static_scrape::relabel_stages(&StaticScrapeSpec::default(), &target).is_empty());

    let spec = StaticScrapeSpec { job_name: Some("fixed".into()), ..Default::default() };
    assert_eq!(static_scrape::relabel_stages(&spec, &target), vec![RelabelStage::set("job", "fixed")]);
}

#[rstest]
fn test_probe_stages_with_user_rules() {
    let spec = ProbeSpec {
        prober: ProberSpec { url: "blackbox:9115".into(), ..Default::default() },
        targets: ProbeTargets {
            static_config: Some(ProbeStaticConfig {
                targets: vec!["https://example.com".into()],
                relabeling_configs: vec![user_rule("keep", "instance")],
                ..Default::default()
            }),
        },
        ..Default::default()
    };

    let stages = probe::relabel_stages(&spec);
    assert_eq!(stages.len(), 4);
    assert_eq!(stages[2], RelabelStage::set("__address__", "blackbox:9115"));
}

#[rstest]
#[case::own_namespace(NamespaceSelector::default(), false, vec!["default"])]
#[case::any(NamespaceSelector { any: true, match_names: vec![] }, false, vec![])]
#[case::match_names(NamespaceSelector { any: false, match_names: vec!["a".into(), "b".into()] }, false, vec!["a", "b"])]
#[case::ignored(NamespaceSelector { any: true, match_names: vec!["a".into()] }, true, vec!["default"])]
fn test_discovery_namespaces(
    #[case] selector: NamespaceSelector,
    #[case] ignore: bool,
    #[case] expected: Vec<&str>,
) {
    let config = CompilerConfig::default().ignore_namespace_selectors(ignore);
    assert_eq!(discovery_namespaces(&selector, "default", &config), expected);
}

#[tokio::test]
async fn test_synthesize_drops_only_failing_endpoint() {
    let store = creds_store();
    let mut resolver = CredentialResolver::new(&store, "/certs");
    let mut bad = endpoint("web", "/bad");
    bad.auth.bearer_token_secret = Some(SecretKeyRef::new("missing", "token"));
    let resource = ScrapeResource::from(service_scrape(
        TEST_NAMESPACE,
        "api",
        ServiceScrapeSpec {
            endpoints: vec![endpoint("web", "/a"), bad, endpoint("web", "/c")],
            ..Default::default()
        },
    ));

    let outcomes = synthesize(&resource, &mut resolver, &CompilerConfig::default()).await.unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[1], EndpointOutcome::Dropped(ref r) if r.name == "missing"));

    let numbered = number_jobs(&resource, outcomes);
    let names: Vec<_> = numbered.jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["serviceScrape/default/api/0", "serviceScrape/default/api/1"]);
    assert_eq!(numbered.jobs[1].job.metrics_path.as_deref(), Some("/c"));
    assert_eq!(numbered.dropped.len(), 1);
    assert_eq!(numbered.dropped[0].endpoint, 1);
    assert_eq!(numbered.dropped[0].resource, "ServiceScrape default/api");
}

#[tokio::test]
async fn test_number_jobs_collects_assets_of_survivors_only() {
    let store = InMemoryCredentialStore::new().with_secret("default", "tls", [("ca", "some-ca")]);
    let mut resolver = CredentialResolver::new(&store, "/certs");
    let tls = |name: &str| sc_api::TlsConfig {
        ca: sc_api::SecretOrConfigMap::from_secret(name, "ca"),
        ..Default::default()
    };
    let mut good = endpoint("web", "/good");
    good.auth.tls_config = Some(tls("tls"));
    let mut bad = endpoint("web", "/bad");
    bad.auth.tls_config = Some(tls("tls"));
    bad.auth.basic_auth = Some(sc_api::BasicAuth {
        username: SecretKeyRef::new("nope", "user"),
        ..Default::default()
    });
    let resource = ScrapeResource::from(pod_scrape(
        "default",
        "api",
        PodScrapeSpec { pod_metrics_endpoints: vec![bad, good], ..Default::default() },
    ));

    let outcomes = synthesize(&resource, &mut resolver, &CompilerConfig::default()).await.unwrap();
    let numbered = number_jobs(&resource, outcomes);

    assert_eq!(numbered.jobs.len(), 1);
    assert_eq!(numbered.jobs[0].name, "podScrape/default/api/0");
    assert_eq!(numbered.tls_assets, BTreeMap::from([("default_tls_ca".to_string(), b"some-ca".to_vec())]));
    assert!(numbered.jobs[0].job.auth.tls_assets.is_empty());
}

#[tokio::test]
async fn test_synthesize_probe_defaults() {
    let store = InMemoryCredentialStore::new();
    let mut resolver = CredentialResolver::new(&store, "/certs");
    let resource = ScrapeResource::from(probe(
        "kube-system",
        "blackbox",
        ProbeSpec {
            module: "http_2xx".into(),
            prober: ProberSpec { url: "http://blackbox".into(), scheme: Some("https".into()), path: None },
            ..Default::default()
        },
    ));

    let outcomes = synthesize(&resource, &mut resolver, &CompilerConfig::default()).await.unwrap();
    let EndpointOutcome::Compiled(job) = &outcomes[0] else { panic!("probe should compile") };

    assert_eq!(job.metrics_path.as_deref(), Some("/probe"));
    assert_eq!(job.scheme.as_deref(), Some("https"));
    assert_eq!(job.params, BTreeMap::from([("module".to_string(), vec!["http_2xx".to_string()])]));
    assert_eq!(job.discovery, Discovery::Static { targets: vec![], labels: BTreeMap::new() });
}

#[tokio::test]
async fn test_synthesize_drops_endpoint_with_binary_token() {
    let store = InMemoryCredentialStore::new().with_secret("default", "binary", [("token", vec![0xc3u8, 0x28])]);
    let mut resolver = CredentialResolver::new(&store, "/certs");
    let mut ep = endpoint("9100", "/metrics");
    ep.auth.bearer_token_secret = Some(SecretKeyRef::new("binary", "token"));
    let resource = ScrapeResource::from(node_scrape("default", "nodes", NodeScrapeSpec { endpoint: ep, job_label: None }));

    let outcomes = synthesize(&resource, &mut resolver, &CompilerConfig::default()).await.unwrap();
    assert!(matches!(outcomes[0], EndpointOutcome::Dropped(ref r) if r.key == "token"));
}
