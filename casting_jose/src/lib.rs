//! Primitives from the Javascript/JSON Object Signing and Encryption (JOSE)
//! standards needed to verify bearer tokens issued by an external identity
//! provider:
//!
//! * JSON Web Signature (JWS): [RFC7515][]
//! * JSON Web Key (JWK): [RFC7517][]
//! * JSON Web Algorithms (JWA): [RFC7518][]
//! * JSON Web Token (JWT): [RFC7519][]
//!
//! Only RSA signatures are supported. With the `private-keys` feature,
//! tokens can also be minted, which is useful for tests and local tooling.
//!
//! [RFC7515]: https://tools.ietf.org/html/rfc7515
//! [RFC7517]: https://tools.ietf.org/html/rfc7517
//! [RFC7518]: https://tools.ietf.org/html/rfc7518
//! [RFC7519]: https://tools.ietf.org/html/rfc7519
//!
//! # Example
//!
//! ```
//! use casting_jose::{jwa, jwt, Jwks, JwtRef};
//!
//! let validator = jwt::CoreValidator::new(
//!     jwa::SigningAlgorithm::RS256,
//!     jwt::Issuer::from_static("https://casting.example.com/"),
//!     jwt::Audience::from_static("casting"),
//! );
//!
//! // An unsigned token is rejected on its header alone.
//! let token = JwtRef::from_str("eyJhbGciOiJub25lIn0.e30.");
//! let decomposed = token.decompose().unwrap();
//! assert!(validator.check_algorithm(decomposed.untrusted_header()).is_err());
//!
//! let keys = Jwks::default();
//! assert!(keys.keys().is_empty());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

pub mod b64;
pub mod clock;
pub mod error;
pub mod jwa;
pub mod jwk;
mod jwks;
pub mod jwt;
#[cfg(any(test, feature = "private-keys"))]
mod signing;

#[cfg(test)]
pub(crate) mod test;

#[doc(inline)]
pub use jwk::Jwk;
#[doc(inline)]
pub use jwks::Jwks;
#[doc(inline)]
pub use jwt::{Jwt, JwtRef};
#[cfg(any(test, feature = "private-keys"))]
#[cfg_attr(docsrs, doc(cfg(feature = "private-keys")))]
pub use signing::RsaPrivateKey;
