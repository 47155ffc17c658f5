use crate::{jwa, jwk, Jwk};

use serde::{Deserialize, Serialize};

/// A JSON Web Key Set (JWKS)
///
/// Entries that are not usable RSA signing keys are dropped with a warning
/// while deserializing, so one exotic key published by the identity
/// provider does not make the whole set unusable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    #[serde(deserialize_with = "deserialize_keys")]
    keys: Vec<Jwk>,
}

impl Jwks {
    /// A view of the keys in this set
    #[must_use]
    pub fn keys(&self) -> &[Jwk] {
        &self.keys
    }

    /// Whether the set holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Gets the key with the given ID, provided it can verify `alg` signatures
    ///
    /// A key that carries the right ID but is pinned to another algorithm or
    /// marked for encryption is treated as absent.
    #[must_use]
    pub fn get_key_by_id(
        &self,
        kid: &'_ jwk::KeyIdRef,
        alg: jwa::SigningAlgorithm,
    ) -> Option<&Jwk> {
        self.keys
            .iter()
            .filter(|k| k.key_id() == Some(kid))
            .find(|k| k.is_compatible(alg))
    }
}

impl FromIterator<Jwk> for Jwks {
    fn from_iter<I: IntoIterator<Item = Jwk>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<Jwk>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct MaybeJwksVisitor;

    impl<'de> serde::de::Visitor<'de> for MaybeJwksVisitor {
        type Value = Vec<Jwk>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a list of JWK objects")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());
            let mut index = 0_usize;

            while let Some(value) = seq.next_element()? {
                match value {
                    MaybeJwk::Jwk(jwk) => values.push(jwk),
                    MaybeJwk::Unknown(key) => {
                        tracing::warn!(
                            jwks.idx = index,
                            jwk.kid = ?key.kid,
                            jwk.kty = ?key.kty,
                            jwk.alg = ?key.alg,
                            "ignoring unusable JWK"
                        );
                    }
                }
                index += 1;
            }

            Ok(values)
        }
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MaybeJwk {
        Jwk(Jwk),
        Unknown(JwkLike),
    }

    #[derive(serde::Deserialize)]
    struct JwkLike {
        #[serde(default)]
        kid: Option<jwk::KeyId>,
        #[serde(default)]
        kty: Option<String>,
        #[serde(default)]
        alg: Option<String>,
    }

    deserializer.deserialize_seq(MaybeJwksVisitor)
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use tracing_test::traced_test;

    use super::*;
    use crate::{jwk::KeyIdRef, test::rsa};

    const JWKS_WITH_UNKNOWN_ALG: &str = r#"
        {
            "keys": [
                {
                    "kid": "1",
                    "kty": "RSA",
                    "use": "enc",
                    "alg": "RSA-OAEP"
                }
            ]
        }
    "#;

    const JWKS_WITH_NOTHING: &str = r#"
        {
            "keys": [
                {}
            ]
        }
    "#;

    #[test]
    #[traced_test]
    fn deserializes_jwks_with_unknown_alg() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(JWKS_WITH_UNKNOWN_ALG)?;
        assert!(jwks.is_empty());
        assert!(logs_contain("ignoring unusable JWK"));
        Ok(())
    }

    #[test]
    #[traced_test]
    fn deserialize_jwks_with_nothing() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(JWKS_WITH_NOTHING)?;
        assert!(jwks.is_empty());
        Ok(())
    }

    #[test]
    #[traced_test]
    fn mixed_set_keeps_only_rsa_keys() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(rsa::JWKS)?;
        assert_eq!(jwks.keys().len(), 1);
        Ok(())
    }

    #[test]
    fn lookup_requires_matching_kid_and_compatible_alg() -> Result<()> {
        let jwks: Jwks = serde_json::from_str(rsa::JWKS)?;
        let kid = KeyIdRef::from_str(rsa::SIGNING_KEY_ID);

        assert!(jwks
            .get_key_by_id(kid, jwa::SigningAlgorithm::RS256)
            .is_some());
        assert!(jwks
            .get_key_by_id(kid, jwa::SigningAlgorithm::PS256)
            .is_none());
        assert!(jwks
            .get_key_by_id(KeyIdRef::from_str("shared"), jwa::SigningAlgorithm::RS256)
            .is_none());
        Ok(())
    }
}
