//! A full compilation pass: list, enumerate, synthesize, assemble, persist.
use std::sync::Arc;

use sc_core::prelude::*;
use tracing::{
    info,
    instrument,
};

use crate::assemble::{
    CompiledDocument,
    GlobalSection,
};
use crate::config::CompilerConfig;
use crate::enumerate::{
    enumerate,
    ScrapeLists,
};
use crate::errors::CompileError;
use crate::resolve::{
    CredentialResolver,
    TlsAssets,
};
use crate::synth::{
    number_jobs,
    synthesize,
    DroppedEndpoint,
};

/// Result of compiling one agent's scrape resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compilation {
    pub document: CompiledDocument,
    /// Endpoints left out because of missing credentials, in compilation order.
    pub dropped: Vec<DroppedEndpoint>,
    /// TLS material the surviving jobs reference, to be mounted under the configured assets dir.
    pub tls_assets: TlsAssets,
}

/// Compile `lists` into a document for `agent`.
///
/// This is pure apart from credential lookups: the same lists and the same store contents always
/// yield the same document.
#[instrument(skip_all, fields(agent = %agent, resources = lists.len()))]
pub async fn compile(
    agent: &AgentRef,
    lists: ScrapeLists,
    store: &dyn CredentialStore,
    config: &CompilerConfig,
) -> Result<Compilation, StoreError> {
    let mut resolver = CredentialResolver::new(store, &config.tls_assets_dir);
    let mut jobs = vec![];
    let mut dropped = vec![];
    let mut tls_assets = TlsAssets::new();

    for resource in enumerate(lists) {
        let outcomes = synthesize(&resource, &mut resolver, config).await?;
        let mut numbered = number_jobs(&resource, outcomes);
        jobs.append(&mut numbered.jobs);
        dropped.append(&mut numbered.dropped);
        tls_assets.append(&mut numbered.tls_assets);
    }

    Ok(Compilation {
        document: CompiledDocument { global: GlobalSection::new(config, agent), jobs },
        dropped,
        tls_assets,
    })
}

/// Runs compilation passes against a fixed set of collaborators.
pub struct ScrapeConfigCompiler {
    lister: Arc<dyn ScrapeLister>,
    store: Arc<dyn CredentialStore>,
    persister: Arc<dyn ConfigPersister>,
    config: CompilerConfig,
}

impl ScrapeConfigCompiler {
    pub fn new(
        lister: Arc<dyn ScrapeLister>,
        store: Arc<dyn CredentialStore>,
        persister: Arc<dyn ConfigPersister>,
        config: CompilerConfig,
    ) -> Self {
        Self { lister, store, persister, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// List, compile, serialize and persist the document for `agent`.
    ///
    /// Any collaborator failure aborts the pass before anything is saved.
    #[instrument(skip(self, selectors), fields(agent = %agent))]
    pub async fn run_pass(&self, agent: &AgentRef, selectors: &ScrapeSelectors) -> Result<Compilation, CompileError> {
        let lists = self.list_all(selectors).await?;
        let compilation = compile(agent, lists, self.store.as_ref(), &self.config).await?;
        let document = compilation.document.to_yaml()?;
        self.persister.save(agent, document.as_bytes()).await?;

        info!(
            jobs = compilation.document.jobs.len(),
            dropped = compilation.dropped.len(),
            tls_assets = compilation.tls_assets.len(),
            "scrape configuration persisted"
        );
        Ok(compilation)
    }

    async fn list_all(&self, selectors: &ScrapeSelectors) -> Result<ScrapeLists, StoreError> {
        let lister = self.lister.as_ref();
        let (service, pod, probe, node, static_scrape) = futures::try_join!(
            lister.list(ScrapeKind::Service, selectors.for_kind(ScrapeKind::Service)),
            lister.list(ScrapeKind::Pod, selectors.for_kind(ScrapeKind::Pod)),
            lister.list(ScrapeKind::Probe, selectors.for_kind(ScrapeKind::Probe)),
            lister.list(ScrapeKind::Node, selectors.for_kind(ScrapeKind::Node)),
            lister.list(ScrapeKind::Static, selectors.for_kind(ScrapeKind::Static)),
        )?;
        Ok(ScrapeLists { service, pod, probe, node, static_scrape })
    }
}
