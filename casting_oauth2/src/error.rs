//! Errors raised while verifying and authorizing tokens

use casting_jose::error::{ClaimsRejected, JwtVerifyError};
use thiserror::Error;

use crate::Permission;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The identity provider's key set could not be obtained
///
/// This is an infrastructure failure rather than a property of the token.
/// The key store has already retried once before surfacing it.
#[derive(Debug, Error)]
pub enum KeyFetchError {
    /// The key set endpoint could not be reached
    #[error("key set endpoint is unreachable")]
    Unreachable(#[source] BoxError),
    /// The key set endpoint responded with an unexpected status
    #[error("key set endpoint responded with status {0}")]
    UnexpectedStatus(u16),
    /// The key set endpoint returned something other than a key set
    #[error("key set endpoint returned a malformed key set")]
    Malformed(#[source] BoxError),
}

impl KeyFetchError {
    /// Wraps a transport error
    pub fn unreachable(err: impl Into<BoxError>) -> Self {
        Self::Unreachable(err.into())
    }

    /// Wraps a decoding error
    pub fn malformed(err: impl Into<BoxError>) -> Self {
        Self::Malformed(err.into())
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for KeyFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(err)
        } else if let Some(status) = err.status() {
            Self::UnexpectedStatus(status.as_u16())
        } else {
            Self::unreachable(err)
        }
    }
}

/// A token was not accepted
///
/// Each variant is a distinct reason for logs. Callers facing the outside
/// world should collapse all of them into one unauthorized outcome.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token could not be parsed
    #[error("malformed token")]
    MalformedToken(#[source] JwtVerifyError),
    /// The token declares an algorithm other than the one accepted
    #[error("token algorithm not accepted")]
    AlgorithmMismatch(#[source] JwtVerifyError),
    /// No key with the token's key ID exists, even after a refresh
    #[error("no matching key found to verify token")]
    UnknownKey,
    /// The signature does not match the header and claims
    #[error("invalid token signature")]
    InvalidSignature(#[source] JwtVerifyError),
    /// The claims are not acceptable
    #[error("invalid token claims: {0}")]
    InvalidClaims(#[source] ClaimsRejected),
    /// The token is valid but does not grant the required permission
    #[error("token does not grant permission '{required}'")]
    InsufficientPermission {
        /// The permission the operation requires
        required: Permission,
    },
    /// The key set could not be fetched to verify the token
    #[error("signing keys unavailable")]
    KeyUnavailable(#[from] KeyFetchError),
}

impl AuthError {
    /// Whether retrying the same request later might succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::KeyUnavailable(_))
    }

    /// A stable machine-readable label for the failure
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::AlgorithmMismatch(_) => "algorithm_mismatch",
            Self::UnknownKey => "unknown_key",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::InvalidClaims(c) => c.reason(),
            Self::InsufficientPermission { .. } => "insufficient_permission",
            Self::KeyUnavailable(_) => "key_unavailable",
        }
    }
}

impl From<JwtVerifyError> for AuthError {
    fn from(err: JwtVerifyError) -> Self {
        match err {
            JwtVerifyError::AlgorithmRejected(_) => Self::AlgorithmMismatch(err),
            JwtVerifyError::JwkVerifyError(_) => Self::InvalidSignature(err),
            JwtVerifyError::ClaimsRejected(c) => Self::InvalidClaims(c),
            JwtVerifyError::MalformedToken(_)
            | JwtVerifyError::MalformedTokenHeader(_)
            | JwtVerifyError::MalformedTokenPayload(_)
            | JwtVerifyError::MalformedTokenSignature(_) => Self::MalformedToken(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use casting_jose::{jwa, jwt, JwtRef};

    use super::*;

    #[test]
    fn jose_errors_map_to_distinct_reasons() {
        let validator = jwt::CoreValidator::new(
            jwa::SigningAlgorithm::RS256,
            jwt::Issuer::from_static("https://casting.example.com/"),
            jwt::Audience::from_static("casting"),
        );
        let header = jwt::Headers::new(jwa::SigningAlgorithm::PS256);
        let rejected = validator.check_algorithm(&header).unwrap_err();
        let malformed = JwtRef::from_str("not-a-token").decompose().unwrap_err();

        let cases: [(JwtVerifyError, &str); 4] = [
            (malformed, "malformed_token"),
            (rejected.into(), "algorithm_mismatch"),
            (ClaimsRejected::TokenExpired.into(), "token_expired"),
            (ClaimsRejected::InvalidAudience.into(), "invalid_audience"),
        ];

        for (err, reason) in cases {
            assert_eq!(AuthError::from(err).reason(), reason);
        }
    }

    #[test]
    fn only_key_fetch_failures_are_transient() {
        assert!(AuthError::from(KeyFetchError::UnexpectedStatus(502)).is_transient());
        assert!(!AuthError::UnknownKey.is_transient());
        assert!(!AuthError::InsufficientPermission {
            required: Permission::from_static("get:actors"),
        }
        .is_transient());
    }
}
