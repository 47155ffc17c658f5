//! Token verification against the key store

use std::sync::Arc;

use casting_jose::{
    clock::UnixTime,
    error::ClaimsRejected,
    jwt::{self, CoreClaims},
    JwtRef,
};
use serde::Deserialize;

use crate::{AuthError, KeyStore, PermissionRef, Permissions};

#[derive(Debug, Deserialize)]
struct AccessClaims {
    #[serde(default)]
    aud: jwt::Audiences,
    #[serde(default)]
    iss: Option<jwt::Issuer>,
    #[serde(default)]
    sub: Option<jwt::Subject>,
    #[serde(default)]
    exp: Option<UnixTime>,
    #[serde(default)]
    nbf: Option<UnixTime>,
    #[serde(default)]
    permissions: Permissions,
}

impl CoreClaims for AccessClaims {
    fn nbf(&self) -> Option<UnixTime> {
        self.nbf
    }

    fn exp(&self) -> Option<UnixTime> {
        self.exp
    }

    fn aud(&self) -> &jwt::Audiences {
        &self.aud
    }

    fn iss(&self) -> Option<&jwt::IssuerRef> {
        self.iss.as_deref()
    }

    fn sub(&self) -> Option<&jwt::SubjectRef> {
        self.sub.as_deref()
    }
}

/// The claims of a token that passed verification
///
/// Only [`TokenVerifier::verify`] produces values of this type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct VerifiedToken {
    subject: jwt::Subject,
    issuer: jwt::Issuer,
    audiences: jwt::Audiences,
    expires_at: UnixTime,
    not_before: Option<UnixTime>,
    permissions: Permissions,
}

impl VerifiedToken {
    /// The principal the token was issued to
    #[must_use]
    pub fn subject(&self) -> &jwt::SubjectRef {
        &self.subject
    }

    /// The issuer of the token
    #[must_use]
    pub fn issuer(&self) -> &jwt::IssuerRef {
        &self.issuer
    }

    /// The audiences the token was issued for
    pub fn audiences(&self) -> &jwt::Audiences {
        &self.audiences
    }

    /// When the token expires
    #[must_use]
    pub fn expires_at(&self) -> UnixTime {
        self.expires_at
    }

    /// When the token became valid, if restricted
    #[must_use]
    pub fn not_before(&self) -> Option<UnixTime> {
        self.not_before
    }

    /// The permissions granted by the token
    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Whether the token grants `permission`
    #[must_use]
    pub fn has_permission(&self, permission: &PermissionRef) -> bool {
        self.permissions.contains(permission)
    }
}

impl VerifiedToken {
    fn from_claims(claims: AccessClaims) -> Result<Self, ClaimsRejected> {
        let issuer = claims
            .iss
            .ok_or(ClaimsRejected::MissingRequiredClaim("iss"))?;
        let expires_at = claims
            .exp
            .ok_or(ClaimsRejected::MissingRequiredClaim("exp"))?;
        let subject = claims
            .sub
            .ok_or(ClaimsRejected::MissingRequiredClaim("sub"))?;

        Ok(Self {
            subject,
            issuer,
            audiences: claims.aud,
            expires_at,
            not_before: claims.nbf,
            permissions: claims.permissions,
        })
    }
}

/// Verifies bearer tokens issued by the identity provider
///
/// Verification consults the network only through the key store, and only
/// when its cache cannot answer. With a warm cache and a fixed clock, the
/// same token always yields the same result.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: KeyStore,
    validator: Arc<jwt::CoreValidator>,
}

impl TokenVerifier {
    /// Constructs a verifier
    pub fn new(keys: KeyStore, validator: jwt::CoreValidator) -> Self {
        Self {
            keys,
            validator: Arc::new(validator),
        }
    }

    /// The key store used to resolve signing keys
    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// The validator applied to every token
    pub fn validator(&self) -> &jwt::CoreValidator {
        &self.validator
    }

    /// Verifies a token and extracts its permissions
    ///
    /// The algorithm declared in the header is checked against the pinned
    /// algorithm before any key is looked up.
    ///
    /// # Errors
    ///
    /// Returns the specific [`AuthError`] for the first check that fails.
    pub async fn verify(&self, token: &JwtRef) -> Result<VerifiedToken, AuthError> {
        let decomposed = token.decompose().map_err(AuthError::MalformedToken)?;

        let alg = self
            .validator
            .check_algorithm(decomposed.untrusted_header())
            .map_err(|e| AuthError::AlgorithmMismatch(e.into()))?;

        let kid = decomposed.kid().ok_or_else(|| {
            tracing::debug!(%alg, "token header names no key");
            AuthError::UnknownKey
        })?;

        let key = self.keys.get_key(kid, alg).await?;

        let validated: jwt::Validated<AccessClaims> = decomposed.verify(&key, &self.validator)?;
        let (_, claims) = validated.extract();

        VerifiedToken::from_claims(claims).map_err(AuthError::InvalidClaims)
    }
}
