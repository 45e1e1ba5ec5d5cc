//! In-process collaborators, for embedding the compiler without a cluster and for tests.
use std::collections::BTreeMap;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Mutex,
    PoisonError,
};

use async_trait::async_trait;
use sc_api::{
    ScrapeKind,
    ScrapeResource,
};

use super::{
    AgentRef,
    ConfigPersister,
    CredentialKind,
    CredentialRef,
    CredentialStore,
    KindSelectors,
    ScrapeLister,
};
use crate::errors::StoreError;

type ObjectKey = (CredentialKind, String, String);

/// Credential store backed by a map of objects, each holding a map of keys.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    objects: BTreeMap<ObjectKey, BTreeMap<String, Vec<u8>>>,
    lookups: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret<K, V>(self, namespace: &str, name: &str, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        self.with_object(CredentialKind::Secret, namespace, name, data)
    }

    pub fn with_config_map<K, V>(self, namespace: &str, name: &str, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        self.with_object(CredentialKind::ConfigMap, namespace, name, data)
    }

    fn with_object<K, V>(
        mut self,
        kind: CredentialKind,
        namespace: &str,
        name: &str,
        data: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let entry = self.objects.entry((kind, namespace.into(), name.into())).or_default();
        entry.extend(data.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Number of `get` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, reference: &CredentialRef) -> Result<Option<Vec<u8>>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let key = (reference.kind, reference.namespace.clone(), reference.name.clone());
        Ok(self.objects.get(&key).and_then(|data| data.get(&reference.key)).cloned())
    }
}

/// Lister over a fixed set of resources. Selectors are ignored: everything of the requested kind
/// is returned.
#[derive(Debug, Default)]
pub struct InMemoryLister {
    resources: Vec<ScrapeResource>,
}

impl InMemoryLister {
    pub fn new(resources: impl IntoIterator<Item = ScrapeResource>) -> Self {
        Self { resources: resources.into_iter().collect() }
    }
}

#[async_trait]
impl ScrapeLister for InMemoryLister {
    async fn list(&self, kind: ScrapeKind, _selectors: &KindSelectors) -> Result<Vec<ScrapeResource>, StoreError> {
        Ok(self.resources.iter().filter(|r| r.kind() == kind).cloned().collect())
    }
}

/// Keeps the last document saved for each agent.
#[derive(Debug, Default)]
pub struct InMemoryPersister {
    documents: Mutex<BTreeMap<AgentRef, Vec<u8>>>,
}

impl InMemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self, owner: &AgentRef) -> Option<Vec<u8>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).get(owner).cloned()
    }
}

#[async_trait]
impl ConfigPersister for InMemoryPersister {
    async fn save(&self, owner: &AgentRef, document: &[u8]) -> Result<(), StoreError> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).insert(owner.clone(), document.to_vec());
        Ok(())
    }
}
