use std::collections::BTreeMap;

use assertables::assert_contains;
use insta::assert_snapshot;
use sc_api::{
    SecretKeyRef,
    SecretOrConfigMap,
};
use sc_core::store::InMemoryCredentialStore;
use sc_core::testutils::*;

use super::*;

const TLS_DIR: &str = "/etc/vmagent-tls/certs";

fn tls_store() -> InMemoryCredentialStore {
    InMemoryCredentialStore::new().with_secret(
        "default",
        "tls-secret",
        [("ca", "some-ca"), ("cert", "some-cert"), ("key", "some-key")],
    )
}

fn yaml(key: &str, m: MapSlice) -> String {
    serde_yaml::to_string(&MapSlice::new().with(key, m)).unwrap()
}

#[tokio::test]
async fn test_tls_ca_only() {
    let store = tls_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let tls = TlsConfig { ca: SecretOrConfigMap::from_secret("tls-secret", "ca"), ..Default::default() };

    let mut assets = TlsAssets::new();
    let stanza = resolver.tls_config("default", &tls, &mut assets).await.unwrap();

    assert_snapshot!(yaml("tls_config", stanza), @r"
tls_config:
  insecure_skip_verify: false
  ca_file: /etc/vmagent-tls/certs/default_tls-secret_ca
");
    assert_eq!(assets, BTreeMap::from([("default_tls-secret_ca".to_string(), b"some-ca".to_vec())]));
}

#[tokio::test]
async fn test_tls_ca_cert_and_key() {
    let store = tls_store();
    let mut resolver = CredentialResolver::new(&store, "/etc/vmagent-tls/certs/");
    let tls = TlsConfig {
        ca: SecretOrConfigMap::from_secret("tls-secret", "ca"),
        cert: SecretOrConfigMap::from_secret("tls-secret", "cert"),
        key_secret: Some(SecretKeyRef::new("tls-secret", "key")),
        server_name: Some("api.internal".into()),
        ..Default::default()
    };

    let mut assets = TlsAssets::new();
    let stanza = resolver.tls_config("default", &tls, &mut assets).await.unwrap();

    assert_snapshot!(yaml("tls_config", stanza), @r"
tls_config:
  insecure_skip_verify: false
  ca_file: /etc/vmagent-tls/certs/default_tls-secret_ca
  cert_file: /etc/vmagent-tls/certs/default_tls-secret_cert
  key_file: /etc/vmagent-tls/certs/default_tls-secret_key
  server_name: api.internal
");
    assert_eq!(assets.len(), 3);
}

#[tokio::test]
async fn test_tls_inline_paths_pass_through() {
    let store = tls_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let tls = TlsConfig {
        ca_file: Some("/var/run/ca.crt".into()),
        ca: SecretOrConfigMap::from_secret("tls-secret", "ca"),
        key_file: Some("/var/run/tls.key".into()),
        insecure_skip_verify: true,
        ..Default::default()
    };

    let mut assets = TlsAssets::new();
    let stanza = resolver.tls_config("default", &tls, &mut assets).await.unwrap();

    assert_eq!(stanza.keys().collect::<Vec<_>>(), vec!["insecure_skip_verify", "ca_file", "key_file"]);
    assert!(assets.is_empty());
    assert_eq!(store.lookups(), 0);
}

#[tokio::test]
async fn test_missing_reference_is_not_found() {
    let store = tls_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let tls = TlsConfig { cert: SecretOrConfigMap::from_secret("tls-creds", "cert"), ..Default::default() };

    let err = resolver.tls_config("default", &tls, &mut TlsAssets::new()).await.unwrap_err();
    let reference = match err {
        ResolveError::NotFound(r) => r,
        other => panic!("expected not found, got {other:?}"),
    };
    assert_eq!(reference.asset_name(), "default_tls-creds_cert");
    assert_contains!(reference.to_string(), "tls-creds");
}

#[tokio::test]
async fn test_lookups_are_cached() {
    let store = creds_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let present = CredentialRef::secret(TEST_NAMESPACE, &SecretKeyRef::new(TEST_CREDS_SECRET, "username"));
    let absent = CredentialRef::secret(TEST_NAMESPACE, &SecretKeyRef::new("nope", "username"));

    for _ in 0..3 {
        assert_eq!(resolver.resolve(present.clone()).await.unwrap(), b"some-username".to_vec());
        assert!(matches!(resolver.resolve(absent.clone()).await, Err(ResolveError::NotFound(_))));
    }
    assert_eq!(store.lookups(), 2);
}

#[tokio::test]
async fn test_store_error_is_propagated() {
    let mut store = MockCredentialStore::new();
    store.expect_get().returning(|_| Err(StoreError::unavailable("connection refused")));
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);

    let err = resolver.resolve(CredentialRef::secret("default", &SecretKeyRef::new("a", "b"))).await.unwrap_err();
    assert!(matches!(err, ResolveError::Store(StoreError::Unavailable(_))));
}

#[tokio::test]
async fn test_basic_auth_with_password_file() {
    let store = creds_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let auth = BasicAuth {
        username: SecretKeyRef::new(TEST_CREDS_SECRET, "username"),
        password: None,
        password_file: Some("/etc/secrets/password".into()),
    };

    let stanza = resolver.basic_auth(TEST_NAMESPACE, &auth).await.unwrap();
    assert_snapshot!(yaml("basic_auth", stanza), @r"
basic_auth:
  username: some-username
  password_file: /etc/secrets/password
");
}

#[tokio::test]
async fn test_oauth2_full() {
    let store = creds_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let auth = OAuth2 {
        client_id: SecretOrConfigMap::from_secret(TEST_CREDS_SECRET, "cid"),
        client_secret: None,
        client_secret_file: Some("/etc/secrets/cs".into()),
        scopes: vec!["read".into(), "write".into()],
        endpoint_params: BTreeMap::from([("b".to_string(), "2".to_string()), ("a".to_string(), "x".to_string())]),
        token_url: "https://some-tr".into(),
    };

    let stanza = resolver.oauth2(TEST_NAMESPACE, &auth).await.unwrap();
    assert_snapshot!(yaml("oauth2", stanza), @r"
oauth2:
  client_id: some-client-id
  client_secret_file: /etc/secrets/cs
  scopes:
  - read
  - write
  endpoint_params:
    a: x
    b: '2'
  token_url: https://some-tr
");
}

#[tokio::test]
async fn test_endpoint_auth_with_proxy() {
    let store = creds_store();
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let auth = EndpointAuth {
        bearer_token_secret: Some(SecretKeyRef::new(TEST_CREDS_SECRET, "bearer")),
        ..Default::default()
    };
    let proxy = ProxyAuth {
        tls_config: Some(TlsConfig {
            insecure_skip_verify: true,
            ca: SecretOrConfigMap::from_secret(TEST_CREDS_SECRET, "ca"),
            ..Default::default()
        }),
        bearer_token_file: Some("/var/run/proxy-token".into()),
        ..Default::default()
    };

    let resolved = resolver.endpoint_auth(TEST_NAMESPACE, &auth, Some(&proxy)).await.unwrap();

    assert_eq!(resolved.bearer_token.as_deref(), Some("some-bearer"));
    assert_eq!(resolved.proxy_bearer_token_file.as_deref(), Some("/var/run/proxy-token"));
    assert!(resolved.proxy_tls_config.is_some());
    assert!(resolved.tls_config.is_none());
    assert_eq!(resolved.tls_assets.keys().collect::<Vec<_>>(), vec!["default_access-creds_ca"]);
}

#[tokio::test]
async fn test_binary_inline_credential_is_rejected() {
    let store = InMemoryCredentialStore::new().with_secret("default", "binary", [("token", vec![0xffu8, 0xfe, 0x00])]);
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let auth = EndpointAuth { bearer_token_secret: Some(SecretKeyRef::new("binary", "token")), ..Default::default() };

    let err = resolver.endpoint_auth("default", &auth, None).await.unwrap_err();
    assert!(matches!(err, ResolveError::NotUtf8(ref r) if r.name == "binary"));
}

#[tokio::test]
async fn test_binary_tls_material_is_mounted() {
    let store = InMemoryCredentialStore::new().with_secret("default", "binary", [("ca", vec![0xffu8, 0xfe, 0x00])]);
    let mut resolver = CredentialResolver::new(&store, TLS_DIR);
    let tls = TlsConfig { ca: SecretOrConfigMap::from_secret("binary", "ca"), ..Default::default() };

    let mut assets = TlsAssets::new();
    resolver.tls_config("default", &tls, &mut assets).await.unwrap();
    assert_eq!(assets["default_binary_ca"], vec![0xff, 0xfe, 0x00]);
}
