//! Process configuration, read from flags or `CASTING_*` environment variables

use std::{net::SocketAddr, time::Duration};

use casting_jose::{
    jwa::SigningAlgorithm,
    jwt::{Audience, CoreValidator, Issuer},
};
use casting_oauth2::KeyStoreOptions;
use clap::Parser;

/// Serves the casting catalog
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// The identity provider trusted to issue access tokens
    #[arg(long, env = "CASTING_ISSUER")]
    pub issuer: Issuer,

    /// The audience access tokens must be issued for
    #[arg(long, env = "CASTING_AUDIENCE")]
    pub audience: Audience,

    /// Where the identity provider publishes its signing keys
    ///
    /// Defaults to `.well-known/jwks.json` under the issuer.
    #[arg(long, env = "CASTING_JWKS_URL")]
    pub jwks_url: Option<String>,

    /// The only signing algorithm accepted on access tokens
    #[arg(long, env = "CASTING_ALGORITHM", default_value = "RS256")]
    pub algorithm: SigningAlgorithm,

    /// The address to listen on
    #[arg(long, env = "CASTING_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// How long a fetched key set is trusted before it is fetched again
    #[arg(long, env = "CASTING_KEY_CACHE_TTL_SECS", default_value_t = 600)]
    pub key_cache_ttl_secs: u64,

    /// How often the key set is refreshed in the background
    #[arg(
        long,
        env = "CASTING_JWKS_REFRESH_SECS",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub jwks_refresh_secs: u64,

    /// Clock skew tolerated when checking `exp` and `nbf`
    #[arg(long, env = "CASTING_LEEWAY_SECS", default_value_t = 0)]
    pub leeway_secs: u64,
}

impl Config {
    /// The key set URL, derived from the issuer unless set explicitly
    #[must_use]
    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => {
                let issuer = self.issuer.as_str();
                let separator = if issuer.ends_with('/') { "" } else { "/" };
                format!("{issuer}{separator}.well-known/jwks.json")
            }
        }
    }

    /// The validator applied to every access token
    pub fn validator(&self) -> CoreValidator {
        CoreValidator::new(self.algorithm, self.issuer.clone(), self.audience.clone())
            .with_leeway_secs(self.leeway_secs)
    }

    /// Caching behavior for the signing key set
    #[must_use]
    pub fn key_store_options(&self) -> KeyStoreOptions {
        KeyStoreOptions::default().with_cache_ttl(Duration::from_secs(self.key_cache_ttl_secs))
    }

    /// The interval between background key set refreshes
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.jwks_refresh_secs)
    }
}
