use arc_swap::ArcSwap;
use async_trait::async_trait;
use casting_jose::Jwks;

use super::JwksSource;
use crate::KeyFetchError;

/// A key set held in memory
///
/// Useful for tests and for running without an identity provider. The set
/// can be replaced at runtime to simulate key rotation.
#[derive(Debug)]
pub struct StaticJwks {
    jwks: ArcSwap<Jwks>,
}

impl StaticJwks {
    /// Serves the given key set
    pub fn new(jwks: Jwks) -> Self {
        Self {
            jwks: ArcSwap::from_pointee(jwks),
        }
    }

    /// Replaces the key set served from now on
    pub fn set_jwks(&self, jwks: Jwks) {
        self.jwks.store(jwks.into());
    }
}

#[async_trait]
impl JwksSource for StaticJwks {
    async fn fetch(&self) -> Result<Jwks, KeyFetchError> {
        Ok(Jwks::clone(&self.jwks.load()))
    }
}
