//! In-process stand-in for the parts of the Vault HTTP API the client uses.
//!
//! Models:
//! - KV v2 `data/` reads, including soft-deleted versions
//! - `sys/mounts` listing and enabling (every enabled engine is transit)
//! - transit key read/create and encrypt/decrypt
//!
//! Ciphertexts are `vault:v1:` + base64(`key|nonce|plaintext_b64`), so they
//! are reversible, differ per call and are bound to the key that made them.
//! Like a real Vault, encrypt quietly creates unknown keys.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Map, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::{envelope, ok_json, vault_error};

/// Token every mocked endpoint requires.
pub const ROOT_TOKEN: &str = "root-token";

const TIMESTAMP: &str = "2024-03-22T02:24:06.945319214Z";

#[derive(Clone)]
enum KvEntry {
    Data(Map<String, Value>),
    Deleted,
}

#[derive(Default)]
struct State {
    kv: HashMap<String, KvEntry>,
    transit_mounts: BTreeSet<String>,
    transit_keys: BTreeSet<(String, String)>,
}

/// Handle to a running mock Vault.
pub struct MockVault {
    pub server: MockServer,
    state: Arc<Mutex<State>>,
}

impl MockVault {
    /// Start a Vault with a KV v2 engine at `secret/` and no transit engine.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(State::default()));
        let nonce = Arc::new(AtomicU64::new(1));

        let st = state.clone();
        Mock::given(method("GET"))
            .and(path("/v1/sys/mounts"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |_: &Request| {
                let state = st.lock().unwrap();
                let mut mounts = Map::new();
                let kv_options = Some(json!({ "version": "2" }));
                mounts.insert("secret/".to_string(), mount_entry("kv", kv_options));
                mounts.insert("sys/".to_string(), mount_entry("system", None));
                for mount in &state.transit_mounts {
                    mounts.insert(format!("{}/", mount), mount_entry("transit", None));
                }
                ok_json(Value::Object(mounts))
            })
            .mount(&server)
            .await;

        let st = state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/sys/mounts/[^/]+$"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |req: &Request| {
                let mount = last_segment(req);
                let mut state = st.lock().unwrap();
                if mount == "secret" || !state.transit_mounts.insert(mount.clone()) {
                    let message = format!("path is already in use at {}/", mount);
                    return vault_error(400, &[message.as_str()]);
                }
                ResponseTemplate::new(204)
            })
            .mount(&server)
            .await;

        let st = state.clone();
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/secret/data/.+$"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |req: &Request| {
                let key = kv_key(req, "/v1/secret/data/");
                let state = st.lock().unwrap();
                match state.kv.get(&key) {
                    Some(KvEntry::Data(data)) => ok_json(json!({
                        "data": data,
                        "metadata": version_metadata(false),
                    })),
                    // Vault keeps the version metadata in the 404 body
                    Some(KvEntry::Deleted) => ResponseTemplate::new(404)
                        .set_body_json(envelope(json!({
                            "data": null,
                            "metadata": version_metadata(true),
                        })))
                        .insert_header("content-type", "application/json"),
                    None => vault_error(404, &[]),
                }
            })
            .mount(&server)
            .await;

        let st = state.clone();
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/[^/]+/keys/[^/]+$"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |req: &Request| {
                let mount = first_segment(req);
                let name = last_segment(req);
                let state = st.lock().unwrap();
                if !state.transit_keys.contains(&(mount, name.clone())) {
                    return vault_error(404, &[]);
                }
                ok_json(key_info(&name))
            })
            .mount(&server)
            .await;

        let st = state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/[^/]+/keys/[^/]+$"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |req: &Request| {
                let mount = first_segment(req);
                let name = last_segment(req);
                let mut state = st.lock().unwrap();
                if !state.transit_mounts.contains(&mount) {
                    return vault_error(404, &["no handler for route"]);
                }
                state.transit_keys.insert((mount, name));
                ResponseTemplate::new(204)
            })
            .mount(&server)
            .await;

        let st = state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/[^/]+/encrypt/[^/]+$"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |req: &Request| {
                let mount = first_segment(req);
                let name = last_segment(req);
                let body: Value = req.body_json().unwrap_or(Value::Null);
                let Some(plaintext) = body.get("plaintext").and_then(Value::as_str) else {
                    return vault_error(400, &["missing plaintext to encrypt"]);
                };
                if STANDARD.decode(plaintext).is_err() {
                    return vault_error(400, &["failed to base64-decode plaintext"]);
                }
                let mut state = st.lock().unwrap();
                if !state.transit_mounts.contains(&mount) {
                    return vault_error(404, &["no handler for route"]);
                }
                // upsert, as Vault does by default
                state.transit_keys.insert((mount, name.clone()));
                let n = nonce.fetch_add(1, Ordering::SeqCst);
                let sealed = STANDARD.encode(format!("{}|{}|{}", name, n, plaintext));
                ok_json(json!({ "ciphertext": format!("vault:v1:{}", sealed), "key_version": 1 }))
            })
            .mount(&server)
            .await;

        let st = state.clone();
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/[^/]+/decrypt/[^/]+$"))
            .and(header("X-Vault-Token", ROOT_TOKEN))
            .respond_with(move |req: &Request| {
                let mount = first_segment(req);
                let name = last_segment(req);
                let state = st.lock().unwrap();
                if !state.transit_keys.contains(&(mount, name.clone())) {
                    return vault_error(400, &["encryption key not found"]);
                }
                let body: Value = req.body_json().unwrap_or(Value::Null);
                let ciphertext = body.get("ciphertext").and_then(Value::as_str).unwrap_or("");
                match open_ciphertext(ciphertext) {
                    Some((owner, plaintext)) if owner == name => {
                        ok_json(json!({ "plaintext": plaintext }))
                    }
                    Some(_) => vault_error(400, &["cipher: message authentication failed"]),
                    None => vault_error(400, &["invalid ciphertext: no prefix"]),
                }
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Store a KV v2 secret at `secret/{path}`.
    pub fn put_secret(&self, path: &str, data: Value) {
        let data = match data {
            Value::Object(map) => map,
            other => panic!("KV data must be an object, got {}", other),
        };
        self.state.lock().unwrap().kv.insert(path.to_string(), KvEntry::Data(data));
    }

    /// Soft-delete the latest version at `secret/{path}`, keeping its metadata.
    pub fn delete_secret(&self, path: &str) {
        self.state.lock().unwrap().kv.insert(path.to_string(), KvEntry::Deleted);
    }

    pub fn is_transit_mounted(&self, mount: &str) -> bool {
        self.state.lock().unwrap().transit_mounts.contains(mount)
    }

    pub fn has_transit_key(&self, mount: &str, name: &str) -> bool {
        self.state.lock().unwrap().transit_keys.contains(&(mount.to_string(), name.to_string()))
    }

    /// Mount a transit engine directly, as an operator would.
    pub fn mount_transit(&self, mount: &str) {
        self.state.lock().unwrap().transit_mounts.insert(mount.to_string());
    }

    /// Create a transit key directly, as another client would.
    pub fn create_transit_key(&self, mount: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.transit_mounts.insert(mount.to_string());
        state.transit_keys.insert((mount.to_string(), name.to_string()));
    }

    /// Number of `verb` requests received whose path starts with `prefix`.
    pub async fn request_count(&self, verb: &str, prefix: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.method.as_str() == verb && req.url.path().starts_with(prefix))
            .count()
    }
}

fn mount_entry(kind: &str, options: Option<Value>) -> Value {
    json!({
        "accessor": format!("{}_0a1b2c3d", kind),
        "config": {
            "default_lease_ttl": 0,
            "force_no_cache": false,
            "max_lease_ttl": 0
        },
        "description": "",
        "external_entropy_access": false,
        "local": false,
        "options": options,
        "plugin_version": "",
        "running_plugin_version": "",
        "running_sha256": "",
        "seal_wrap": false,
        "type": kind,
        "uuid": "5d1ba2a4-1f46-4f3e-8e6e-0c3b5b7e6f10"
    })
}

/// Key description as `GET {mount}/keys/{name}` returns it.
fn key_info(name: &str) -> Value {
    json!({
        "allow_plaintext_backup": false,
        "auto_rotate_period": 0,
        "deletion_allowed": false,
        "derived": false,
        "exportable": false,
        "imported_key": false,
        "keys": { "1": 1711074246 },
        "latest_version": 1,
        "min_available_version": 0,
        "min_decryption_version": 1,
        "min_encryption_version": 0,
        "name": name,
        "supports_decryption": true,
        "supports_derivation": true,
        "supports_encryption": true,
        "supports_signing": false,
        "type": "aes256-gcm96"
    })
}

fn version_metadata(deleted: bool) -> Value {
    json!({
        "created_time": TIMESTAMP,
        "custom_metadata": null,
        "deletion_time": if deleted { TIMESTAMP } else { "" },
        "destroyed": false,
        "version": 1
    })
}

fn kv_key(req: &Request, prefix: &str) -> String {
    req.url.path().trim_start_matches(prefix).trim_end_matches('/').to_string()
}

fn first_segment(req: &Request) -> String {
    req.url.path().trim_start_matches("/v1/").split('/').next().unwrap_or_default().to_string()
}

fn last_segment(req: &Request) -> String {
    req.url.path().trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string()
}

/// Split a mock ciphertext into (key name, base64 plaintext).
fn open_ciphertext(ciphertext: &str) -> Option<(String, String)> {
    let sealed = ciphertext.strip_prefix("vault:v1:")?;
    let decoded = String::from_utf8(STANDARD.decode(sealed).ok()?).ok()?;
    let mut parts = decoded.splitn(3, '|');
    let name = parts.next()?.to_string();
    let _nonce = parts.next()?;
    let plaintext = parts.next()?.to_string();
    Some((name, plaintext))
}
