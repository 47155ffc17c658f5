//! Byte buffers carried as URL-safe base64 without padding

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The data could not be decoded as URL-safe base64
#[derive(Debug, Error)]
#[error("invalid base64url data")]
pub struct InvalidBase64Data {
    #[from]
    source: base64::DecodeError,
}

/// Owned bytes that are encoded as URL-safe base64 when serialized or displayed
///
/// Debug output is fenced in backticks.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Base64Url(Vec<u8>);

impl Base64Url {
    /// Wraps raw, unencoded bytes
    #[inline]
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    /// Decodes URL-safe base64 data
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid unpadded base64url.
    pub fn from_encoded<T: AsRef<[u8]>>(enc: T) -> Result<Self, InvalidBase64Data> {
        Ok(Self(URL_SAFE_NO_PAD.decode(enc)?))
    }

    /// The raw bytes
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Unwraps the raw bytes
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// The length of the encoded form
    #[inline]
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        Self::calc_encoded_len(self.0.len())
    }

    /// The length of the encoded form of `len` raw bytes
    #[inline]
    #[must_use]
    pub const fn calc_encoded_len(len: usize) -> usize {
        (len * 4 + 2) / 3
    }
}

impl fmt::Display for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl fmt::Debug for Base64Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`{}`", self)
    }
}

impl From<Vec<u8>> for Base64Url {
    #[inline]
    fn from(raw: Vec<u8>) -> Self {
        Self(raw)
    }
}

impl Serialize for Base64Url {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Base64Url {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_encoded(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_len_matches_display() {
        for len in 0..10 {
            let data = Base64Url::from_raw(vec![0xA5; len]);
            assert_eq!(data.to_string().len(), data.encoded_len());
        }
    }

    #[test]
    fn debug_is_fenced() {
        let data = Base64Url::from_raw(&b"hi"[..]);
        assert_eq!(format!("{:?}", data), "`aGk`");
    }

    #[test]
    fn padded_input_is_rejected() {
        assert!(Base64Url::from_encoded("aGk=").is_err());
        assert!(Base64Url::from_encoded("a+b/").is_err());
    }
}
