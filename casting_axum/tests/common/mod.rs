#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use casting_axum::{router, AppState};
use casting_catalog::Catalog;
use casting_jose::{
    clock::{TestClock, UnixTime},
    jwa, jwt, Jwk, Jwks, Jwt, RsaPrivateKey,
};
use casting_oauth2::{
    Gate, JwksSource, KeyFetchError, KeyStore, KeyStoreOptions, StaticJwks, TokenVerifier,
};
use serde_json::{json, Value};

pub const ISSUER: &str = "https://casting.example.com/";
pub const AUDIENCE: &str = "casting";
pub const KEY_ID: &str = "signing-key";
pub const NOW: u64 = 1_700_000_000;

pub const PRODUCER: &[&str] = &[
    "get:actors",
    "add:actor",
    "patch:actor",
    "delete:actor",
    "get:movies",
    "add:movie",
    "patch:movie",
    "delete:movie",
    "assign:actor",
];
pub const ASSISTANT: &[&str] = &["get:actors", "get:movies"];

const SIGNING_KEY_DER: &[u8] = include_bytes!("../../../casting_jose/data/rsa/signing.der");
const SIGNING_JWK: &str = include_str!("../../../casting_jose/data/rsa/signing-jwk.json");

/// A key set endpoint that is always down
#[derive(Debug)]
pub struct UnreachableJwks;

#[async_trait]
impl JwksSource for UnreachableJwks {
    async fn fetch(&self) -> Result<Jwks, KeyFetchError> {
        Err(KeyFetchError::UnexpectedStatus(502))
    }
}

pub struct App {
    pub clock: Arc<TestClock>,
    pub catalog: Catalog,
    pub router: Router,
}

impl App {
    pub fn new() -> Self {
        let jwk: Jwk = serde_json::from_str(SIGNING_JWK).unwrap();
        Self::with_source(StaticJwks::new(std::iter::once(jwk).collect()))
    }

    pub fn with_source(source: impl JwksSource + 'static) -> Self {
        let clock = Arc::new(TestClock::new(UnixTime(NOW)));
        let keys = KeyStore::with_clock(
            source,
            KeyStoreOptions::default().with_retry_delay(Duration::ZERO),
            clock.clone(),
        );
        let validator = jwt::CoreValidator::new(
            jwa::SigningAlgorithm::RS256,
            jwt::Issuer::from_static(ISSUER),
            jwt::Audience::from_static(AUDIENCE),
        )
        .with_clock(clock.clone());

        let catalog = Catalog::new();
        let state = AppState {
            gate: Gate::new(TokenVerifier::new(keys, validator)),
            catalog: catalog.clone(),
        };

        Self {
            clock,
            catalog,
            router: router(state),
        }
    }
}

/// A token signed by the trusted key, granting `permissions`
pub fn token(permissions: &[&str]) -> Jwt {
    let claims = json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|casting-agent",
        "exp": NOW + 300,
        "permissions": permissions,
    });
    let headers = jwt::Headers::with_key_id(jwa::SigningAlgorithm::RS256, KEY_ID);
    let key = RsaPrivateKey::from_der(SIGNING_KEY_DER).unwrap();
    Jwt::try_from_parts_with_signature(&headers, &claims, &key).unwrap()
}

pub fn request(method: Method, uri: &str, token: Option<&Jwt>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token.as_str()));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
