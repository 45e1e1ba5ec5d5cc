use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    ConfigMap,
    Secret,
};
use k8s_openapi::ByteString;
use kube::Api;
use tracing::{
    debug,
    instrument,
};

use super::{
    CredentialKind,
    CredentialRef,
    CredentialStore,
};
use crate::errors::StoreError;

/// Reads credential material straight from the cluster's Secrets and ConfigMaps.
#[derive(Clone)]
pub struct KubeCredentialStore {
    client: kube::Client,
}

impl KubeCredentialStore {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CredentialStore for KubeCredentialStore {
    #[instrument(skip(self), fields(reference = %reference))]
    async fn get(&self, reference: &CredentialRef) -> Result<Option<Vec<u8>>, StoreError> {
        let value = match reference.kind {
            CredentialKind::Secret => {
                let api: Api<Secret> = Api::namespaced(self.client.clone(), &reference.namespace);
                api.get_opt(&reference.name).await?.and_then(|secret| secret_value(&secret, &reference.key))
            },
            CredentialKind::ConfigMap => {
                let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &reference.namespace);
                api.get_opt(&reference.name).await?.and_then(|cm| config_map_value(&cm, &reference.key))
            },
        };

        if value.is_none() {
            debug!("credential not present in cluster");
        }
        Ok(value)
    }
}

fn lookup_bytes(data: Option<&BTreeMap<String, ByteString>>, key: &str) -> Option<Vec<u8>> {
    data.and_then(|d| d.get(key)).map(|v| v.0.clone())
}

fn lookup_string(data: Option<&BTreeMap<String, String>>, key: &str) -> Option<Vec<u8>> {
    data.and_then(|d| d.get(key)).map(|v| v.as_bytes().to_vec())
}

/// `data` first, then the write-only `stringData` (only populated on objects that have not been
/// round-tripped through the API server, e.g. in tests).
pub(super) fn secret_value(secret: &Secret, key: &str) -> Option<Vec<u8>> {
    lookup_bytes(secret.data.as_ref(), key).or_else(|| lookup_string(secret.string_data.as_ref(), key))
}

pub(super) fn config_map_value(cm: &ConfigMap, key: &str) -> Option<Vec<u8>> {
    lookup_string(cm.data.as_ref(), key).or_else(|| lookup_bytes(cm.binary_data.as_ref(), key))
}
