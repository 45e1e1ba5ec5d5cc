//! Fixtures and mocks shared by the test suites of the scrapeconf crates.
use async_trait::async_trait;
use mockall::mock;
use rstest::*;
use sc_api::{
    Endpoint,
    NodeScrape,
    NodeScrapeSpec,
    PodScrape,
    PodScrapeSpec,
    Probe,
    ProbeSpec,
    ServiceScrape,
    ServiceScrapeSpec,
    StaticScrape,
    StaticScrapeSpec,
};

use crate::store::{
    AgentRef,
    ConfigPersister,
    CredentialRef,
    CredentialStore,
    InMemoryCredentialStore,
    KindSelectors,
    ScrapeLister,
};
use crate::StoreError;

pub const TEST_NAMESPACE: &str = "default";
pub const TEST_AGENT_NAME: &str = "test";
pub const TEST_CREDS_SECRET: &str = "access-creds";

mock! {
    pub CredentialStore {}

    #[async_trait]
    impl CredentialStore for CredentialStore {
        async fn get(&self, reference: &CredentialRef) -> Result<Option<Vec<u8>>, StoreError>;
    }
}

mock! {
    pub ScrapeLister {}

    #[async_trait]
    impl ScrapeLister for ScrapeLister {
        async fn list(
            &self,
            kind: sc_api::ScrapeKind,
            selectors: &KindSelectors,
        ) -> Result<Vec<sc_api::ScrapeResource>, StoreError>;
    }
}

mock! {
    pub ConfigPersister {}

    #[async_trait]
    impl ConfigPersister for ConfigPersister {
        async fn save(&self, owner: &AgentRef, document: &[u8]) -> Result<(), StoreError>;
    }
}

#[fixture]
pub fn test_agent() -> AgentRef {
    AgentRef::new(TEST_NAMESPACE, TEST_AGENT_NAME)
}

/// A store holding the `access-creds` Secret every credential fixture points at.
#[fixture]
pub fn creds_store() -> InMemoryCredentialStore {
    InMemoryCredentialStore::new().with_secret(
        TEST_NAMESPACE,
        TEST_CREDS_SECRET,
        [
            ("cid", "some-client-id"),
            ("cs", "some-client-secret"),
            ("username", "some-username"),
            ("password", "some-password"),
            ("ca", "some-ca-cert"),
            ("cert", "some-cert"),
            ("key", "some-key"),
            ("bearer", "some-bearer"),
        ],
    )
}

pub fn endpoint(port: &str, path: &str) -> Endpoint {
    Endpoint { port: Some(port.into()), path: Some(path.into()), ..Default::default() }
}

pub fn service_scrape(namespace: &str, name: &str, spec: ServiceScrapeSpec) -> ServiceScrape {
    let mut scrape = ServiceScrape::new(name, spec);
    scrape.metadata.namespace = Some(namespace.into());
    scrape
}

pub fn pod_scrape(namespace: &str, name: &str, spec: PodScrapeSpec) -> PodScrape {
    let mut scrape = PodScrape::new(name, spec);
    scrape.metadata.namespace = Some(namespace.into());
    scrape
}

pub fn node_scrape(namespace: &str, name: &str, spec: NodeScrapeSpec) -> NodeScrape {
    let mut scrape = NodeScrape::new(name, spec);
    scrape.metadata.namespace = Some(namespace.into());
    scrape
}

pub fn static_scrape(namespace: &str, name: &str, spec: StaticScrapeSpec) -> StaticScrape {
    let mut scrape = StaticScrape::new(name, spec);
    scrape.metadata.namespace = Some(namespace.into());
    scrape
}

pub fn probe(namespace: &str, name: &str, spec: ProbeSpec) -> Probe {
    let mut probe = Probe::new(name, spec);
    probe.metadata.namespace = Some(namespace.into());
    probe
}
