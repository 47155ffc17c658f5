//! Bearer token verification and permission gating
//!
//! Tokens are issued by an external identity provider and signed with one
//! of its RSA keys. The [`KeyStore`] caches those keys, the
//! [`TokenVerifier`] checks a token's signature and claims, and the [`Gate`]
//! requires one [`Permission`] per operation.
//!
//! # Feature flags
//!
//! The `reqwest` feature (on by default) provides [`RemoteJwks`] for
//! fetching keys over HTTP. This crate does not enable TLS support in
//! `reqwest` itself. If the only reason you are using `reqwest` is
//! transitively through this crate, enable the `default-tls` or
//! `rustls-tls` feature to call out to an HTTPS endpoint.

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

mod error;
mod gate;
pub mod key_store;
pub mod permission;
mod verifier;

pub use error::{AuthError, KeyFetchError};
pub use gate::Gate;
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub use key_store::RemoteJwks;
pub use key_store::{JwksSource, KeyStore, KeyStoreOptions, StaticJwks};
pub use permission::{Permission, PermissionRef, Permissions};
pub use verifier::{TokenVerifier, VerifiedToken};
