//! RSA private keys for minting tokens in tests and tooling

use std::{fmt, sync::Arc};

use ring::signature::RsaKeyPair;

use crate::{error, jwa::SigningAlgorithm};

/// An RSA private key
///
/// Key material is never printed.
#[derive(Clone)]
pub struct RsaPrivateKey {
    pair: Arc<RsaKeyPair>,
}

impl RsaPrivateKey {
    /// Imports a private key from a PKCS#1 `RSAPrivateKey` DER document
    ///
    /// # Errors
    ///
    /// The document is not a valid RSA private key.
    pub fn from_der(der: &[u8]) -> Result<Self, error::KeyRejected> {
        let pair = RsaKeyPair::from_der(der).map_err(|e| error::key_rejected(e.to_string()))?;
        Ok(Self {
            pair: Arc::new(pair),
        })
    }

    pub(crate) fn sign(
        &self,
        alg: SigningAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, error::Unexpected> {
        let mut buf = vec![0; self.pair.public().modulus_len()];
        self.pair
            .sign(
                alg.signing_params(),
                &ring::rand::SystemRandom::new(),
                data,
                &mut buf,
            )
            .map_err(|e| error::unexpected(e.to_string()))?;
        Ok(buf)
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("modulus_len", &self.pair.public().modulus_len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}
