use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use casting_jose::Jwks;
use reqwest::{
    header::{self, HeaderValue},
    Client, StatusCode,
};

use super::JwksSource;
use crate::KeyFetchError;

#[derive(Debug)]
struct Validator {
    etag: HeaderValue,
    jwks: Jwks,
}

/// A key set published by an identity provider at a URL
///
/// Sends the last seen `ETag` as `If-None-Match` and reuses the previous
/// set when the provider answers `304 Not Modified`.
#[derive(Debug)]
pub struct RemoteJwks {
    url: String,
    client: Client,
    last: ArcSwapOption<Validator>,
}

impl RemoteJwks {
    /// Reads the key set from `url` with a default client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>) -> Result<Self, KeyFetchError> {
        let client = Client::builder()
            .user_agent(concat!("casting_oauth2/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(KeyFetchError::unreachable)?;

        Ok(Self::with_client(url, client))
    }

    /// Reads the key set from `url` using an existing client
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
            last: ArcSwapOption::empty(),
        }
    }

    /// The key set URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JwksSource for RemoteJwks {
    #[tracing::instrument(skip(self), fields(jwks.url = tracing::field::Empty))]
    async fn fetch(&self) -> Result<Jwks, KeyFetchError> {
        let span = tracing::Span::current();
        span.record("jwks.url", self.url.as_str());
        tracing::debug!("fetching JWKS");

        let last = self.last.load_full();
        let mut request = self.client.get(&self.url);
        if let Some(last) = &last {
            request = request.header(header::IF_NONE_MATCH, &last.etag);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            if let Some(last) = last {
                tracing::debug!("JWKS not modified");
                return Ok(last.jwks.clone());
            }
        }

        if !response.status().is_success() {
            tracing::warn!(
                http.status_code = response.status().as_u16(),
                "JWKS fetch failed; unexpected response status",
            );
            return Err(KeyFetchError::UnexpectedStatus(response.status().as_u16()));
        }

        let etag = response.headers().get(header::ETAG).map(ToOwned::to_owned);
        let jwks = response
            .json::<Jwks>()
            .await
            .map_err(KeyFetchError::malformed)?;

        self.last.store(etag.map(|etag| {
            Validator {
                etag,
                jwks: jwks.clone(),
            }
            .into()
        }));

        Ok(jwks)
    }
}
