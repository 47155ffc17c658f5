//! Implementations of the JSON Web Key (JWK) standard
//!
//! The specifications for this standard can be found in [RFC7517][].
//!
//! Only RSA public keys are understood. A verifier never needs private
//! material, and the accepted algorithm family is RSA only.
//!
//! [RFC7517]: https://tools.ietf.org/html/rfc7517

use aliri_braid::braid;
use serde::{Deserialize, Serialize};

use crate::{b64::Base64Url, error, jwa};

/// Smallest accepted RSA modulus, in bytes
const MIN_MODULUS_LEN: usize = 256;

/// Largest accepted RSA modulus, in bytes
const MAX_MODULUS_LEN: usize = 1024;

/// An identifier for a JWK
#[braid(serde, ref_doc = "A borrowed reference to a [`KeyId`]")]
pub struct KeyId;

/// RSA public key components
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RsaPublicKey {
    modulus: Base64Url,
    exponent: Base64Url,
}

impl RsaPublicKey {
    /// Constructs a public key from the modulus and exponent
    ///
    /// # Errors
    ///
    /// The modulus must be between 2048 and 8192 bits, and the exponent
    /// must be present.
    pub fn from_components(
        modulus: impl Into<Base64Url>,
        exponent: impl Into<Base64Url>,
    ) -> Result<Self, error::KeyRejected> {
        let modulus = modulus.into();
        let exponent = exponent.into();

        let len = modulus.as_slice().len();
        if !(MIN_MODULUS_LEN..=MAX_MODULUS_LEN).contains(&len) {
            return Err(error::key_rejected(format!(
                "key modulus must be between 2048 and 8192 bits, got {}",
                len * 8
            )));
        }

        if exponent.as_slice().is_empty() || exponent.as_slice().len() > 8 {
            return Err(error::key_rejected("key exponent is out of range"));
        }

        Ok(Self { modulus, exponent })
    }

    /// The public key's modulus
    #[must_use]
    pub fn modulus(&self) -> &[u8] {
        self.modulus.as_slice()
    }

    /// The public key's exponent
    #[must_use]
    pub fn exponent(&self) -> &[u8] {
        self.exponent.as_slice()
    }

    fn verify(
        &self,
        alg: jwa::SigningAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::SignatureMismatch> {
        let pk = ring::signature::RsaPublicKeyComponents {
            n: self.modulus.as_slice(),
            e: self.exponent.as_slice(),
        };

        pk.verify(alg.verification_params(), data, signature)
            .map_err(|_| error::signature_mismatch())
    }
}

/// A JSON Web Key holding an RSA public key
///
/// The `kty` member must be `RSA`. Keys that carry an `alg` can only be
/// used with that algorithm, and keys marked for encryption can never
/// verify a signature.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JwkDto", into = "JwkDto")]
#[must_use]
pub struct Jwk {
    key_id: Option<KeyId>,
    usage: Option<jwa::Usage>,
    algorithm: Option<jwa::SigningAlgorithm>,
    key: RsaPublicKey,
}

impl Jwk {
    /// Sets the key ID
    pub fn with_key_id(self, kid: impl Into<KeyId>) -> Self {
        Self {
            key_id: Some(kid.into()),
            ..self
        }
    }

    /// Restricts the intended usage of the key
    pub fn with_usage(self, usage: jwa::Usage) -> Self {
        Self {
            usage: Some(usage),
            ..self
        }
    }

    /// The key ID, if any
    #[must_use]
    pub fn key_id(&self) -> Option<&KeyIdRef> {
        self.key_id.as_deref()
    }

    /// The intended usage, if restricted
    pub fn usage(&self) -> Option<jwa::Usage> {
        self.usage
    }

    /// The pinned algorithm, if any
    #[must_use]
    pub fn algorithm(&self) -> Option<jwa::SigningAlgorithm> {
        self.algorithm
    }

    /// The RSA public key
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.key
    }

    /// Whether this key may verify signatures produced with `alg`
    #[must_use]
    pub fn is_compatible(&self, alg: jwa::SigningAlgorithm) -> bool {
        self.usage != Some(jwa::Usage::Encryption) && self.algorithm.map_or(true, |a| a == alg)
    }

    /// Verifies `signature` over `data` using this key
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be used with `alg`, or if the
    /// signature does not match.
    pub fn verify(
        &self,
        alg: jwa::SigningAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), error::JwkVerifyError> {
        if self.usage == Some(jwa::Usage::Encryption) {
            return Err(error::jwk_usage_mismatch().into());
        }

        if let Some(pinned) = self.algorithm {
            if pinned != alg {
                return Err(error::incompatible_algorithm(alg).into());
            }
        }

        Ok(self.key.verify(alg, data, signature)?)
    }
}

impl From<RsaPublicKey> for Jwk {
    fn from(key: RsaPublicKey) -> Self {
        Self {
            key_id: None,
            usage: None,
            algorithm: None,
            key,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum KeyType {
    #[serde(rename = "RSA")]
    Rsa,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct JwkDto {
    kty: KeyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<KeyId>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    usage: Option<jwa::Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<jwa::SigningAlgorithm>,
    n: Base64Url,
    e: Base64Url,
}

impl TryFrom<JwkDto> for Jwk {
    type Error = error::KeyRejected;

    fn try_from(dto: JwkDto) -> Result<Self, Self::Error> {
        let KeyType::Rsa = dto.kty;

        Ok(Self {
            key_id: dto.kid,
            usage: dto.usage,
            algorithm: dto.alg,
            key: RsaPublicKey::from_components(dto.n, dto.e)?,
        })
    }
}

impl From<Jwk> for JwkDto {
    fn from(jwk: Jwk) -> Self {
        Self {
            kty: KeyType::Rsa,
            kid: jwk.key_id,
            usage: jwk.usage,
            alg: jwk.algorithm,
            n: jwk.key.modulus,
            e: jwk.key.exponent,
        }
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::test::rsa;

    #[test]
    fn decodes_signing_jwk() -> Result<()> {
        let jwk: Jwk = serde_json::from_str(rsa::SIGNING_JWK)?;

        assert_eq!(jwk.key_id(), Some(KeyIdRef::from_str(rsa::SIGNING_KEY_ID)));
        assert_eq!(jwk.algorithm(), Some(jwa::SigningAlgorithm::RS256));
        assert_eq!(jwk.usage(), Some(jwa::Usage::Signing));
        assert_eq!(jwk.public_key().modulus().len(), 256);
        Ok(())
    }

    #[test]
    fn rejects_non_rsa_key_types() {
        const EC: &str = r#"{"kty":"EC","crv":"P-256","x":"AA","y":"AA"}"#;
        const OCT: &str = r#"{"kty":"oct","k":"c2VjcmV0"}"#;

        assert!(serde_json::from_str::<Jwk>(EC).is_err());
        assert!(serde_json::from_str::<Jwk>(OCT).is_err());
    }

    #[test]
    fn rejects_short_modulus() {
        let result = RsaPublicKey::from_components(vec![0xC5; 128], vec![1, 0, 1]);
        assert!(result.is_err());
    }

    #[test]
    fn pinned_key_refuses_other_algorithms() -> Result<()> {
        let jwk: Jwk = serde_json::from_str(rsa::SIGNING_JWK)?;

        assert!(jwk.is_compatible(jwa::SigningAlgorithm::RS256));
        assert!(!jwk.is_compatible(jwa::SigningAlgorithm::PS256));

        let err = jwk
            .verify(jwa::SigningAlgorithm::PS256, b"message", &[0; 256])
            .unwrap_err();
        assert!(err.is_incompatible_alg());
        Ok(())
    }

    #[test]
    fn encryption_keys_never_verify() -> Result<()> {
        let jwk = serde_json::from_str::<Jwk>(rsa::SIGNING_JWK)?.with_usage(jwa::Usage::Encryption);

        assert!(!jwk.is_compatible(jwa::SigningAlgorithm::RS256));
        let err = jwk
            .verify(jwa::SigningAlgorithm::RS256, b"message", &[0; 256])
            .unwrap_err();
        assert!(err.is_usage_mismatch());
        Ok(())
    }

    #[test]
    fn garbage_signature_is_a_mismatch() -> Result<()> {
        let jwk: Jwk = serde_json::from_str(rsa::SIGNING_JWK)?;

        let err = jwk
            .verify(jwa::SigningAlgorithm::RS256, b"message", &[0x42; 256])
            .unwrap_err();
        assert!(err.is_signature_mismatch());
        Ok(())
    }
}
