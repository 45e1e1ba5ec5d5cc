//! Resolution of credential references into the inline values and mounted file paths the agent
//! expects.
use std::collections::{
    BTreeMap,
    HashMap,
};

use sc_api::{
    BasicAuth,
    EndpointAuth,
    OAuth2,
    ProxyAuth,
    TlsConfig,
};
use sc_core::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::yaml::MapSlice;

/// Mounted TLS material, keyed by file name (`<namespace>_<object>_<key>`).
pub type TlsAssets = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{0} not found")]
    NotFound(CredentialRef),

    /// A credential that has to be inlined is not text. TLS material is mounted and never checked.
    #[error("{0} is not valid UTF-8")]
    NotUtf8(CredentialRef),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Every credential stanza one endpoint contributes to its job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedAuth {
    pub tls_config: Option<MapSlice>,
    pub bearer_token_file: Option<String>,
    pub bearer_token: Option<String>,
    pub basic_auth: Option<MapSlice>,
    pub oauth2: Option<MapSlice>,
    pub proxy_basic_auth: Option<MapSlice>,
    pub proxy_tls_config: Option<MapSlice>,
    pub proxy_bearer_token: Option<String>,
    pub proxy_bearer_token_file: Option<String>,

    /// TLS files the stanzas above point at. Only meaningful if the endpoint is kept.
    pub tls_assets: TlsAssets,
}

/// Resolves credential references for a single compilation pass.
///
/// Every lookup is cached for the lifetime of the resolver, not-found results included, so an
/// object referenced by many endpoints is fetched once.
pub struct CredentialResolver<'a> {
    store: &'a dyn CredentialStore,
    tls_assets_dir: String,
    cache: HashMap<CredentialRef, Option<Vec<u8>>>,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(store: &'a dyn CredentialStore, tls_assets_dir: &str) -> Self {
        Self {
            store,
            tls_assets_dir: tls_assets_dir.trim_end_matches('/').into(),
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, reference: CredentialRef) -> Result<Vec<u8>, ResolveError> {
        let value = match self.cache.get(&reference) {
            Some(cached) => cached.clone(),
            None => {
                let fetched = self.store.get(&reference).await?;
                self.cache.insert(reference.clone(), fetched.clone());
                fetched
            },
        };
        value.ok_or(ResolveError::NotFound(reference))
    }

    pub async fn resolve_string(&mut self, reference: CredentialRef) -> Result<String, ResolveError> {
        let bytes = self.resolve(reference.clone()).await?;
        String::from_utf8(bytes).map_err(|_| ResolveError::NotUtf8(reference))
    }

    /// Resolve everything an endpoint declares; the first missing reference fails the whole unit.
    pub async fn endpoint_auth(
        &mut self,
        namespace: &str,
        auth: &EndpointAuth,
        proxy: Option<&ProxyAuth>,
    ) -> Result<ResolvedAuth, ResolveError> {
        let mut resolved = ResolvedAuth::default();

        if let Some(tls) = &auth.tls_config {
            resolved.tls_config = Some(self.tls_config(namespace, tls, &mut resolved.tls_assets).await?);
        }
        resolved.bearer_token_file = auth.bearer_token_file.clone();
        if let Some(token) = &auth.bearer_token_secret {
            resolved.bearer_token = Some(self.resolve_string(CredentialRef::secret(namespace, token)).await?);
        }
        if let Some(basic) = &auth.basic_auth {
            resolved.basic_auth = Some(self.basic_auth(namespace, basic).await?);
        }
        if let Some(oauth2) = &auth.oauth2 {
            resolved.oauth2 = Some(self.oauth2(namespace, oauth2).await?);
        }

        if let Some(proxy) = proxy {
            if let Some(basic) = &proxy.basic_auth {
                resolved.proxy_basic_auth = Some(self.basic_auth(namespace, basic).await?);
            }
            if let Some(tls) = &proxy.tls_config {
                resolved.proxy_tls_config = Some(self.tls_config(namespace, tls, &mut resolved.tls_assets).await?);
            }
            if let Some(token) = &proxy.bearer_token {
                resolved.proxy_bearer_token = Some(self.resolve_string(CredentialRef::secret(namespace, token)).await?);
            }
            resolved.proxy_bearer_token_file = proxy.bearer_token_file.clone();
        }

        Ok(resolved)
    }

    /// `{username, password | password_file}`
    pub async fn basic_auth(&mut self, namespace: &str, auth: &BasicAuth) -> Result<MapSlice, ResolveError> {
        let mut m = MapSlice::new();
        m.push("username", self.resolve_string(CredentialRef::secret(namespace, &auth.username)).await?);
        match (&auth.password, &auth.password_file) {
            (Some(password), _) => {
                m.push("password", self.resolve_string(CredentialRef::secret(namespace, password)).await?);
            },
            (None, Some(file)) => m.push("password_file", file),
            (None, None) => (),
        }
        Ok(m)
    }

    /// `{client_id, client_secret | client_secret_file, scopes, endpoint_params, token_url}`
    pub async fn oauth2(&mut self, namespace: &str, auth: &OAuth2) -> Result<MapSlice, ResolveError> {
        let mut m = MapSlice::new();
        if let Some(reference) = CredentialRef::from_secret_or_config_map(namespace, &auth.client_id) {
            m.push("client_id", self.resolve_string(reference).await?);
        }
        match (&auth.client_secret, &auth.client_secret_file) {
            (Some(secret), _) => {
                m.push("client_secret", self.resolve_string(CredentialRef::secret(namespace, secret)).await?);
            },
            (None, Some(file)) => m.push("client_secret_file", file),
            (None, None) => (),
        }
        if !auth.scopes.is_empty() {
            m.push("scopes", auth.scopes.clone());
        }
        if !auth.endpoint_params.is_empty() {
            m.push("endpoint_params", &auth.endpoint_params);
        }
        m.push("token_url", &auth.token_url);
        Ok(m)
    }

    /// `{insecure_skip_verify, ca_file, cert_file, key_file, server_name}`
    ///
    /// Referenced material is fetched and added to `assets`; the stanza points at where it will
    /// be mounted.
    pub async fn tls_config(
        &mut self,
        namespace: &str,
        tls: &TlsConfig,
        assets: &mut TlsAssets,
    ) -> Result<MapSlice, ResolveError> {
        let ca = CredentialRef::from_secret_or_config_map(namespace, &tls.ca);
        let cert = CredentialRef::from_secret_or_config_map(namespace, &tls.cert);
        let key = tls.key_secret.as_ref().map(|s| CredentialRef::secret(namespace, s));

        let mut m = MapSlice::new();
        m.push("insecure_skip_verify", tls.insecure_skip_verify);
        m.push_opt("ca_file", self.tls_file(tls.ca_file.as_ref(), ca, assets).await?);
        m.push_opt("cert_file", self.tls_file(tls.cert_file.as_ref(), cert, assets).await?);
        m.push_opt("key_file", self.tls_file(tls.key_file.as_ref(), key, assets).await?);
        m.push_opt("server_name", tls.server_name.as_ref());
        Ok(m)
    }

    async fn tls_file(
        &mut self,
        inline: Option<&String>,
        reference: Option<CredentialRef>,
        assets: &mut TlsAssets,
    ) -> Result<Option<String>, ResolveError> {
        if let Some(path) = inline {
            return Ok(Some(path.clone()));
        }
        let Some(reference) = reference else {
            return Ok(None);
        };

        let name = reference.asset_name();
        let content = self.resolve(reference).await?;
        let path = format!("{}/{name}", self.tls_assets_dir);
        debug!(%path, "tls asset resolved");
        assets.insert(name, content);
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests;
