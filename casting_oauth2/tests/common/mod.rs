#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use casting_jose::{
    b64::Base64Url,
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

const SIGNING_KEY_DER: &[u8] = include_bytes!("../../../casting_jose/data/rsa/signing.der");
const SIGNING_JWK: &str = include_str!("../../../casting_jose/data/rsa/signing-jwk.json");
const ROGUE_KEY_DER: &[u8] = include_bytes!("../../../casting_jose/data/rsa/rogue.der");

/// Serves a fixed key set and counts how often it was asked
#[derive(Debug)]
pub struct CountingJwks {
    inner: StaticJwks,
    fetches: AtomicUsize,
    delay: Duration,
}

impl CountingJwks {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Publishes the signing key under `kid` only, retiring its old ID
    pub fn rotate_to(&self, kid: &str) {
        let jwk: Jwk = serde_json::from_str(SIGNING_JWK).unwrap();
        self.inner
            .set_jwks(std::iter::once(jwk.with_key_id(kid.to_owned())).collect());
    }
}

#[async_trait]
impl JwksSource for CountingJwks {
    async fn fetch(&self) -> Result<Jwks, KeyFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.fetch().await
    }
}

pub struct Fixture {
    pub clock: Arc<TestClock>,
    pub source: Arc<CountingJwks>,
    pub gate: Gate,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_fetch_delay(Duration::ZERO)
    }

    pub fn with_fetch_delay(delay: Duration) -> Self {
        let jwk: Jwk = serde_json::from_str(SIGNING_JWK).unwrap();
        let source = Arc::new(CountingJwks {
            inner: StaticJwks::new(std::iter::once(jwk).collect()),
            fetches: AtomicUsize::new(0),
            delay,
        });

        let clock = Arc::new(TestClock::new(UnixTime(NOW)));
        let keys = KeyStore::with_clock(
            Arc::clone(&source),
            KeyStoreOptions::default().with_retry_delay(Duration::ZERO),
            clock.clone(),
        );
        let validator = jwt::CoreValidator::new(
            jwa::SigningAlgorithm::RS256,
            jwt::Issuer::from_static(ISSUER),
            jwt::Audience::from_static(AUDIENCE),
        )
        .with_clock(clock.clone());

        Self {
            clock,
            source,
            gate: Gate::new(TokenVerifier::new(keys, validator)),
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        self.gate.verifier()
    }
}

/// Claims accepted by the fixture, granting `permissions`
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "iss": ISSUER,
        "aud": [AUDIENCE, "https://casting.example.com/userinfo"],
        "sub": "auth0|producer",
        "exp": NOW + 300,
        "nbf": NOW - 60,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value) -> Jwt {
    sign_with(jwa::SigningAlgorithm::RS256, Some(KEY_ID), SIGNING_KEY_DER, claims)
}

pub fn sign_as(kid: &str, claims: &Value) -> Jwt {
    sign_with(jwa::SigningAlgorithm::RS256, Some(kid), SIGNING_KEY_DER, claims)
}

pub fn sign_with_rogue_key(claims: &Value) -> Jwt {
    sign_with(jwa::SigningAlgorithm::RS256, Some(KEY_ID), ROGUE_KEY_DER, claims)
}

pub fn sign_with(
    alg: jwa::SigningAlgorithm,
    kid: Option<&str>,
    der: &[u8],
    claims: &Value,
) -> Jwt {
    let headers = match kid {
        Some(kid) => jwt::Headers::with_key_id(alg, kid),
        None => jwt::Headers::new(alg),
    };
    let key = RsaPrivateKey::from_der(der).unwrap();
    Jwt::try_from_parts_with_signature(&headers, claims, &key).unwrap()
}

/// A token with an arbitrary header and an arbitrary signature
pub fn forge(header: &Value, claims: &Value, signature: &[u8]) -> Jwt {
    Jwt::new(format!(
        "{}.{}.{}",
        Base64Url::from_raw(serde_json::to_vec(header).unwrap()),
        Base64Url::from_raw(serde_json::to_vec(claims).unwrap()),
        Base64Url::from_raw(signature.to_vec()),
    ))
}
