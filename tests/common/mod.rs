#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use serde_json::{Value, json};

#[path = "../../src/pki/testing.rs"]
mod testing;

pub use testing::{TestAuthority, at};

pub const TOKEN: &str = "s.integration-token";

/// One PKI mount served by the mock Vault.
#[derive(Debug, Default, Clone)]
pub struct MockMount {
    pub crl: Option<String>,
    pub certificates: Vec<(String, Option<String>)>,
}

#[derive(Debug, Default)]
pub struct MockVault {
    pub mounts: HashMap<String, MockMount>,
    pub namespace: Option<String>,
}

type Reply = (StatusCode, Json<Value>);

fn not_found() -> Reply {
    (StatusCode::NOT_FOUND, Json(json!({ "errors": [] })))
}

fn authorize(vault: &MockVault, headers: &HeaderMap) -> Result<(), Reply> {
    let token = headers.get("X-Vault-Token").and_then(|v| v.to_str().ok());
    let namespace = headers.get("X-Vault-Namespace").and_then(|v| v.to_str().ok());
    if token != Some(TOKEN) || namespace != vault.namespace.as_deref() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "errors": ["permission denied"] })),
        ));
    }
    Ok(())
}

async fn lookup_self(State(vault): State<Arc<MockVault>>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&vault, &headers) {
        return reply;
    }
    (
        StatusCode::OK,
        Json(json!({ "data": { "display_name": "token", "policies": ["pki-audit"] } })),
    )
}

async fn read_cert(
    State(vault): State<Arc<MockVault>>,
    Path((mount, serial)): Path<(String, String)>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorize(&vault, &headers) {
        return reply;
    }
    let Some(mount) = vault.mounts.get(&mount) else {
        return not_found();
    };
    let pem = if serial == "crl" {
        mount.crl.clone()
    } else {
        mount
            .certificates
            .iter()
            .find(|(s, _)| *s == serial)
            .and_then(|(_, pem)| pem.clone())
    };
    match pem {
        Some(pem) => (
            StatusCode::OK,
            Json(json!({ "data": { "certificate": pem, "revocation_time": 0 } })),
        ),
        None => not_found(),
    }
}

async fn list_certs(
    State(vault): State<Arc<MockVault>>,
    Path(mount): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply {
    if let Err(reply) = authorize(&vault, &headers) {
        return reply;
    }
    if query.get("list").map(String::as_str) != Some("true") {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "errors": ["1 error occurred:\n\t* unsupported operation\n\n"] })),
        );
    }
    match vault.mounts.get(&mount) {
        Some(mount) if !mount.certificates.is_empty() => {
            let keys: Vec<_> = mount.certificates.iter().map(|(s, _)| s.clone()).collect();
            (StatusCode::OK, Json(json!({ "data": { "keys": keys } })))
        }
        _ => not_found(),
    }
}

/// Spawns the mock Vault on a random port and returns its address.
pub async fn spawn_vault(vault: MockVault) -> String {
    let app = Router::new()
        .route("/v1/auth/token/lookup-self", get(lookup_self))
        .route("/v1/{mount}/certs", get(list_certs))
        .route("/v1/{mount}/cert/{serial}", get(read_cert))
        .with_state(Arc::new(vault));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("failed to run mock vault");
    });

    format!("http://{addr}")
}
