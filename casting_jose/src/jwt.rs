//! Implementations of the JSON Web Tokens (JWT) standard
//!
//! The specifications for this standard can be found in [RFC7519][].
//!
//! Unencrypted JWTs appear as a three-part base64url-encoded string, where
//! each part is separated by a `.`.
//!
//! The first section is the header in JSON format. It names the algorithm
//! and the key used to sign the token. An attacker controls every byte of
//! it, so the algorithm it declares is only ever compared against the single
//! algorithm the [`CoreValidator`] was configured with.
//!
//! The second section is the payload in JSON format, holding claims about
//! who issued the token, who it is for, and how long it is valid. Nothing in
//! this section is looked at before the signature has been verified.
//!
//! The third section is the binary signature over the first two sections.
//!
//! [RFC7519]: https://tools.ietf.org/html/rfc7519

use std::{fmt, sync::Arc, time::Duration};

use aliri_braid::braid;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    b64::Base64Url,
    clock::{Clock, System, UnixTime},
    error, jwa, jwk, Jwk,
};

/// The validated headers and claims of a JWT
///
/// This type can _only_ be generated within this crate to assert that the
/// headers and claims held by this type have already been validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validated<C = BasicClaims> {
    headers: Headers,
    claims: C,
}

impl<C> Validated<C> {
    /// Extracts the header and claims from the token
    pub fn extract(self) -> (Headers, C) {
        (self.headers, self.claims)
    }

    /// The validated token headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The validated token claims
    pub fn claims(&self) -> &C {
        &self.claims
    }
}

/// A decomposed JWT
///
/// All three sections have been split apart and base64url-decoded, and the
/// header has been parsed. None of it has been authenticated yet.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Decomposed<'a> {
    header: Headers,
    message: &'a str,
    payload: Base64Url,
    signature: Base64Url,
}

macro_rules! expect_two {
    ($iter:expr) => {{
        let mut i = $iter;
        match (i.next(), i.next(), i.next()) {
            (Some(first), Some(second), None) => Some((first, second)),
            _ => None,
        }
    }};
}

impl<'a> Decomposed<'a> {
    /// Verifies the decomposed JWT against the given JWK and validator
    ///
    /// The algorithm pin is re-checked here so that a caller cannot skip it
    /// by going straight from decomposition to verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the declared algorithm is not accepted, the
    /// signature does not match, the payload is not valid JSON, or the claims
    /// are rejected by the validator.
    pub fn verify<C>(
        self,
        key: &Jwk,
        validator: &CoreValidator,
    ) -> Result<Validated<C>, error::JwtVerifyError>
    where
        C: DeserializeOwned + CoreClaims,
    {
        let alg = validator.check_algorithm(&self.header)?;

        key.verify(alg, self.message.as_bytes(), self.signature.as_slice())?;

        let payload: C = serde_json::from_slice(self.payload.as_slice())
            .map_err(error::malformed_jwt_payload)?;

        validator.validate(&payload)?;

        Ok(Validated {
            headers: self.header,
            claims: payload,
        })
    }

    /// The untrusted headers of the JWT
    ///
    /// **WARNING:** *These headers have not been validated and should not be trusted.*
    pub fn untrusted_header(&self) -> &Headers {
        &self.header
    }

    /// The algorithm declared by the untrusted header
    #[must_use]
    pub fn alg(&self) -> &str {
        self.header.alg()
    }

    /// The key ID declared by the untrusted header
    #[must_use]
    pub fn kid(&self) -> Option<&jwk::KeyIdRef> {
        self.header.kid()
    }
}

impl JwtRef {
    /// Decomposes the JWT into its parts, preparing it for later processing.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWT does not have exactly three sections, if
    /// any section is not valid base64url, or if the header is not a JSON
    /// object with an `alg` member.
    pub fn decompose(&self) -> Result<Decomposed<'_>, error::JwtVerifyError> {
        let (s_str, message) =
            expect_two!(self.as_str().rsplitn(2, '.')).ok_or_else(error::malformed_jwt)?;
        let (p_str, h_str) =
            expect_two!(message.rsplitn(2, '.')).ok_or_else(error::malformed_jwt)?;
        if h_str.contains('.') {
            return Err(error::malformed_jwt().into());
        }

        let h_raw = Base64Url::from_encoded(h_str).map_err(error::malformed_jwt_header)?;
        let payload = Base64Url::from_encoded(p_str).map_err(error::malformed_jwt_payload)?;
        let signature = Base64Url::from_encoded(s_str).map_err(error::malformed_jwt_signature)?;
        let header: Headers =
            serde_json::from_slice(h_raw.as_slice()).map_err(error::malformed_jwt_header)?;

        Ok(Decomposed {
            header,
            message,
            payload,
            signature,
        })
    }

    /// Verifies a token against a particular JWK and validator
    ///
    /// If you need to inspect the token first to determine which key to use,
    /// use `decompose()` to peek into the JWT.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid according to the validator.
    pub fn verify<C>(
        &self,
        key: &Jwk,
        validator: &CoreValidator,
    ) -> Result<Validated<C>, error::JwtVerifyError>
    where
        C: DeserializeOwned + CoreClaims,
    {
        self.decompose()?.verify(key, validator)
    }
}

/// Core claims that every token accepted by this crate must be able to report
pub trait CoreClaims {
    /// Not before
    ///
    /// A verifier MUST reject this token before the given time.
    fn nbf(&self) -> Option<UnixTime>;

    /// Expires
    ///
    /// A verifier MUST reject this token at or after the given time.
    fn exp(&self) -> Option<UnixTime>;

    /// Audience
    fn aud(&self) -> &Audiences;

    /// Issuer
    fn iss(&self) -> Option<&IssuerRef>;

    /// Subject
    fn sub(&self) -> Option<&SubjectRef>;
}

/// An audience
#[braid(serde, ref_doc = "A borrowed reference to an [`Audience`]")]
pub struct Audience;

/// An issuer of JWTs
#[braid(serde, ref_doc = "A borrowed reference to an [`Issuer`]")]
pub struct Issuer;

/// The subject of a JWT
#[braid(serde, ref_doc = "A borrowed reference to a [`Subject`]")]
pub struct Subject;

/// A JSON Web Token
///
/// This type provides custom implementations of [`Display`][JwtRef#impl-Display] and
/// [`Debug`][JwtRef#impl-Debug] so that tokens are not disclosed in logs by accident.
#[braid(
    serde,
    debug = "owned",
    display = "owned",
    ord = "omit",
    ref_doc = "\
    A borrowed reference to a JSON Web Token ([`Jwt`])\n\
    \n\
    This type provides custom implementations of [`Display`][Self#impl-Display] and \
    [`Debug`][Self#impl-Debug] so that tokens are not disclosed in logs by accident.
    "
)]
#[must_use]
pub struct Jwt;

#[cfg(any(test, feature = "private-keys"))]
impl Jwt {
    /// Constructs a new JWT from a header and payload, signed by the specified key
    ///
    /// Headers and payload will be serialized as JSON blobs.
    ///
    /// # Errors
    ///
    /// * If the algorithm named in the header is not an RSA signing algorithm
    /// * If serialization of either the header or payload fails
    /// * If the key cannot produce a signature
    pub fn try_from_parts_with_signature<P: Serialize>(
        headers: &Headers,
        payload: &P,
        key: &crate::RsaPrivateKey,
    ) -> Result<Self, error::JwtSigningError> {
        let alg: jwa::SigningAlgorithm = headers.alg().parse()?;

        let h_raw =
            Base64Url::from_raw(serde_json::to_vec(headers).map_err(error::malformed_jwt_header)?);
        let p_raw =
            Base64Url::from_raw(serde_json::to_vec(payload).map_err(error::malformed_jwt_payload)?);

        let message = format!("{}.{}", h_raw, p_raw);
        let s = Base64Url::from_raw(key.sign(alg, message.as_bytes())?);

        Ok(Self::new(format!("{}.{}", message, s)))
    }
}

/// By default, this type holds potentially sensitive information. It prints
/// a placeholder unless the alternate form (`{:#?}`) is requested, in which
/// case the header and payload are shown but the signature is elided. A width
/// (`{:#25?}`) reveals that many characters of the signature.
impl fmt::Debug for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            f.write_str("\"")?;
            if let Some(last_period) = self.0.rfind('.') {
                f.write_str(&self.0[..=last_period])?;
                limited_reveal(&self.0[last_period + 1..], &mut *f, 0)?;
            } else {
                limited_reveal(&self.0, &mut *f, 0)?;
            }
            f.write_str("\"")
        } else {
            f.write_str(concat!("***", "JWT", "***"))
        }
    }
}

/// Prints a placeholder unless the alternate form (`{:#}`) is requested, in
/// which case the whole token is printed. A width (`{:#10}`) limits how much
/// of the signature is revealed.
impl fmt::Display for JwtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            if let Some(last_period) = self.0.rfind('.') {
                f.write_str(&self.0[..=last_period])?;
                limited_reveal(&self.0[last_period + 1..], &mut *f, usize::MAX)
            } else {
                limited_reveal(&self.0, &mut *f, usize::MAX)
            }
        } else {
            f.write_str(concat!("***", "JWT", "***"))
        }
    }
}

fn limited_reveal(unprotected: &str, f: &mut fmt::Formatter, default_len: usize) -> fmt::Result {
    let max_len = f.width().unwrap_or(default_len);
    if max_len <= 1 {
        f.write_str("…")
    } else if max_len > unprotected.len() {
        f.write_str(unprotected)
    } else {
        match unprotected.char_indices().nth(max_len - 2) {
            Some((idx, c)) if idx + c.len_utf8() < unprotected.len() => {
                f.write_str(&unprotected[0..idx + c.len_utf8()])?;
                f.write_str("…")
            }
            _ => f.write_str(unprotected),
        }
    }
}

/// A set of zero or more [`Audience`]s
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany<Audience>", into = "OneOrMany<Audience>")]
#[repr(transparent)]
#[must_use]
pub struct Audiences(Vec<Audience>);

impl Audiences {
    /// An empty audience set
    #[inline]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// An audience set with a single audience
    #[inline]
    pub fn single(aud: impl Into<Audience>) -> Self {
        Self(vec![aud.into()])
    }

    /// Indicates whether the audience set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `aud` is one of the audiences in the set
    #[inline]
    #[must_use]
    pub fn contains(&self, aud: &AudienceRef) -> bool {
        self.iter().any(|a| a == aud)
    }

    /// Iterates through references to the audiences in the set
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &AudienceRef> {
        self.0.iter().map(AsRef::as_ref)
    }
}

impl From<OneOrMany<Audience>> for Audiences {
    #[inline]
    fn from(vals: OneOrMany<Audience>) -> Self {
        match vals {
            OneOrMany::One(x) => Self(vec![x]),
            OneOrMany::Many(v) => Self(v),
        }
    }
}

impl From<Audiences> for OneOrMany<Audience> {
    #[inline]
    fn from(mut vec: Audiences) -> Self {
        match vec.0.len() {
            1 => vec.0.pop().map_or_else(|| Self::Many(Vec::new()), Self::One),
            _ => Self::Many(vec.0),
        }
    }
}

impl From<Vec<Audience>> for Audiences {
    #[inline]
    fn from(vals: Vec<Audience>) -> Self {
        Self(vals)
    }
}

impl From<Audience> for Audiences {
    #[inline]
    fn from(aud: Audience) -> Self {
        Self::single(aud)
    }
}

/// A type representing one or more items, primarily for serialization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single item
    One(T),

    /// Zero or more items, to be serialized/deserialized as an array
    Many(Vec<T>),
}

/// The core validator for JWTs
///
/// Accepts exactly one signing algorithm, requires the configured issuer
/// and audience, and always requires an unexpired `exp`. A `nbf` claim is
/// honored when present.
#[derive(Clone)]
#[must_use]
pub struct CoreValidator {
    algorithm: jwa::SigningAlgorithm,
    leeway: Duration,
    issuer: Issuer,
    audience: Audience,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for CoreValidator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CoreValidator")
            .field("algorithm", &self.algorithm)
            .field("leeway", &self.leeway)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl CoreValidator {
    /// Constructs a validator that pins `algorithm` and requires the given
    /// issuer and audience, with no leeway and the system clock
    pub fn new(
        algorithm: jwa::SigningAlgorithm,
        issuer: impl Into<Issuer>,
        audience: impl Into<Audience>,
    ) -> Self {
        Self {
            algorithm,
            leeway: Duration::default(),
            issuer: issuer.into(),
            audience: audience.into(),
            clock: Arc::new(System),
        }
    }

    /// Allows a grace period for token validation
    ///
    /// Applies on either side of the "not before" and "expires" claims.
    #[inline]
    pub fn with_leeway(self, leeway: Duration) -> Self {
        Self { leeway, ..self }
    }

    /// Allows a grace period (in seconds) for token validation
    #[inline]
    pub fn with_leeway_secs(self, leeway: u64) -> Self {
        self.with_leeway(Duration::from_secs(leeway))
    }

    /// Uses `clock` rather than the system clock for time-based checks
    #[inline]
    pub fn with_clock(self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock, ..self }
    }

    /// The single accepted signing algorithm
    #[must_use]
    pub fn algorithm(&self) -> jwa::SigningAlgorithm {
        self.algorithm
    }

    /// The required issuer
    #[must_use]
    pub fn issuer(&self) -> &IssuerRef {
        &self.issuer
    }

    /// The required audience
    #[must_use]
    pub fn audience(&self) -> &AudienceRef {
        &self.audience
    }

    /// The clock used for time-based checks
    #[must_use]
    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        &*self.clock
    }

    /// Checks the declared algorithm against the pinned one
    ///
    /// This is the first thing to check on a decomposed token, before any
    /// key is looked up.
    ///
    /// # Errors
    ///
    /// Returns an error unless the header names exactly the pinned algorithm.
    pub fn check_algorithm(
        &self,
        header: &Headers,
    ) -> Result<jwa::SigningAlgorithm, error::AlgorithmRejected> {
        if header.alg() == self.algorithm.name() {
            Ok(self.algorithm)
        } else {
            Err(error::algorithm_rejected(header.alg()))
        }
    }

    /// Validates the claims against the configured expectations
    ///
    /// # Errors
    ///
    /// Returns the first claim that fails validation.
    pub fn validate<T: CoreClaims>(&self, claims: &T) -> Result<(), error::ClaimsRejected> {
        self.validate_with_clock(claims, &*self.clock)
    }

    /// Validates the claims as of the time given by `clock`
    ///
    /// # Errors
    ///
    /// Returns the first claim that fails validation.
    pub fn validate_with_clock<C: Clock + ?Sized, T: CoreClaims>(
        &self,
        claims: &T,
        clock: &C,
    ) -> Result<(), error::ClaimsRejected> {
        let now = clock.now();
        let leeway = self.leeway.as_secs();

        match claims.exp() {
            Some(exp) if now < exp.saturating_add(leeway) => {}
            Some(_) => return Err(error::ClaimsRejected::TokenExpired),
            None => return Err(error::ClaimsRejected::MissingRequiredClaim("exp")),
        }

        if let Some(nbf) = claims.nbf() {
            if now.saturating_add(leeway) < nbf {
                return Err(error::ClaimsRejected::TokenNotYetValid);
            }
        }

        if claims.aud().is_empty() {
            return Err(error::ClaimsRejected::MissingRequiredClaim("aud"));
        }

        if !claims.aud().contains(&self.audience) {
            return Err(error::ClaimsRejected::InvalidAudience);
        }

        match claims.iss() {
            Some(iss) if iss == &*self.issuer => {}
            Some(_) => return Err(error::ClaimsRejected::InvalidIssuer),
            None => return Err(error::ClaimsRejected::MissingRequiredClaim("iss")),
        }

        Ok(())
    }
}

/// The JWT header
///
/// The algorithm is kept as the raw string from the token so that an
/// unsupported or hostile value still decomposes and can be reported as an
/// algorithm mismatch rather than a parse failure.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Headers {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<jwk::KeyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

impl Headers {
    /// Constructs JWT headers, to be signed by the specified algorithm
    pub fn new(alg: jwa::SigningAlgorithm) -> Self {
        Self {
            alg: alg.name().to_owned(),
            kid: None,
            typ: Some("JWT".to_owned()),
        }
    }

    /// Constructs JWT headers, with a specific signing algorithm and key ID
    pub fn with_key_id(alg: jwa::SigningAlgorithm, kid: impl Into<jwk::KeyId>) -> Self {
        Self {
            kid: Some(kid.into()),
            ..Self::new(alg)
        }
    }

    /// The declared algorithm
    #[must_use]
    pub fn alg(&self) -> &str {
        &self.alg
    }

    /// The declared key ID
    #[must_use]
    pub fn kid(&self) -> Option<&jwk::KeyIdRef> {
        self.kid.as_deref()
    }

    /// The declared media type
    #[must_use]
    pub fn typ(&self) -> Option<&str> {
        self.typ.as_deref()
    }
}

/// Common claims used in JWTs
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct BasicClaims {
    #[serde(default, skip_serializing_if = "Audiences::is_empty")]
    aud: Audiences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nbf: Option<UnixTime>,
}

impl CoreClaims for BasicClaims {
    fn nbf(&self) -> Option<UnixTime> {
        self.nbf
    }

    fn exp(&self) -> Option<UnixTime> {
        self.exp
    }

    fn aud(&self) -> &Audiences {
        &self.aud
    }

    fn iss(&self) -> Option<&IssuerRef> {
        self.iss.as_deref()
    }

    fn sub(&self) -> Option<&SubjectRef> {
        self.sub.as_deref()
    }
}

impl BasicClaims {
    /// Constructs a new, empty payload
    pub const fn new() -> Self {
        Self {
            aud: Audiences::empty(),
            iss: None,
            sub: None,
            exp: None,
            nbf: None,
        }
    }

    /// Sets the `aud` claim for the JWT
    pub fn with_audience(mut self, aud: impl Into<Audience>) -> Self {
        self.aud = Audiences::single(aud);
        self
    }

    /// Sets the `aud` claim for the JWT, where multiple audiences are allowed
    pub fn with_audiences(mut self, aud: impl Into<Audiences>) -> Self {
        self.aud = aud.into();
        self
    }

    /// Sets the `iss` claim for the JWT
    pub fn with_issuer(mut self, iss: impl Into<Issuer>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Sets the `sub` claim for the JWT
    pub fn with_subject(mut self, sub: impl Into<Subject>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the `exp` claim for the JWT
    pub fn with_expiration(mut self, time: UnixTime) -> Self {
        self.exp = Some(time);
        self
    }

    /// Sets the `nbf` claim for the JWT
    pub fn with_not_before(mut self, time: UnixTime) -> Self {
        self.nbf = Some(time);
        self
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;
    use crate::{clock::TestClock, test::rsa, RsaPrivateKey};

    const ISSUER: &str = "https://casting.example.com/";
    const AUDIENCE: &str = "casting";

    fn validator_at(now: u64) -> (CoreValidator, Arc<TestClock>) {
        let clock = Arc::new(TestClock::new(UnixTime(now)));
        let validator = CoreValidator::new(
            jwa::SigningAlgorithm::RS256,
            Issuer::from_static(ISSUER),
            Audience::from_static(AUDIENCE),
        )
        .with_clock(clock.clone());
        (validator, clock)
    }

    fn claims() -> BasicClaims {
        BasicClaims::new()
            .with_issuer(Issuer::from_static(ISSUER))
            .with_audience(Audience::from_static(AUDIENCE))
            .with_subject(Subject::from_static("auth0|director"))
            .with_expiration(UnixTime(1_000))
    }

    fn signing_key() -> Result<(RsaPrivateKey, Jwk)> {
        let private = RsaPrivateKey::from_der(rsa::SIGNING_KEY_DER)?;
        let public: Jwk = serde_json::from_str(rsa::SIGNING_JWK)?;
        Ok((private, public))
    }

    fn encode_segment(json: &str) -> String {
        Base64Url::from_raw(json.as_bytes().to_vec()).to_string()
    }

    #[test]
    fn deserialize_basic_claims() -> Result<()> {
        const DATA: &str = r#"{
                "nbf": 345,
                "iss": "me",
                "aud": "casting"
            }"#;

        let basic: BasicClaims = serde_json::from_str(DATA)?;
        assert_eq!(basic.nbf(), Some(UnixTime(345)));
        assert!(basic.aud().contains(AudienceRef::from_str("casting")));

        Ok(())
    }

    #[test]
    fn round_trip_rs256() -> Result<()> {
        let (private, public) = signing_key()?;
        let (validator, _) = validator_at(500);

        let headers = Headers::with_key_id(jwa::SigningAlgorithm::RS256, rsa::SIGNING_KEY_ID);
        let token = Jwt::try_from_parts_with_signature(&headers, &claims(), &private)?;

        let verified: Validated = token.verify(&public, &validator)?;

        assert_eq!(verified.claims(), &claims());
        assert_eq!(verified.headers(), &headers);
        Ok(())
    }

    #[test]
    fn decompose_exposes_untrusted_kid_and_alg() -> Result<()> {
        let (private, _) = signing_key()?;
        let headers = Headers::with_key_id(jwa::SigningAlgorithm::RS256, rsa::SIGNING_KEY_ID);
        let token = Jwt::try_from_parts_with_signature(&headers, &claims(), &private)?;

        let decomposed = token.decompose()?;

        assert_eq!(decomposed.alg(), "RS256");
        assert_eq!(decomposed.kid(), Some(jwk::KeyIdRef::from_str(rsa::SIGNING_KEY_ID)));
        Ok(())
    }

    #[test]
    fn decompose_rejects_wrong_segment_counts() {
        for raw in ["", "abc", "a.b", "a.b.c.d", "..", "e30.e30"] {
            let err = JwtRef::from_str(raw).decompose().unwrap_err();
            assert!(err.is_malformed(), "{raw:?} gave {err:?}");
        }
    }

    #[test]
    fn decompose_rejects_header_without_alg() {
        let raw = format!("{}.{}.", encode_segment(r#"{"kid":"k"}"#), encode_segment("{}"));
        let err = JwtRef::from_str(&raw).decompose().unwrap_err();
        assert!(matches!(err, error::JwtVerifyError::MalformedTokenHeader(_)));
    }

    #[test]
    fn unsigned_and_symmetric_algorithms_are_rejected_before_the_key() -> Result<()> {
        let (_, public) = signing_key()?;
        let (validator, _) = validator_at(500);
        let payload = serde_json::to_string(&claims())?;

        for alg in ["none", "HS256", "RS384", "PS256"] {
            let header = format!(r#"{{"alg":"{alg}","kid":"{}"}}"#, rsa::SIGNING_KEY_ID);
            let raw = format!("{}.{}.", encode_segment(&header), encode_segment(&payload));
            let token = JwtRef::from_str(&raw);

            let err = token.verify::<BasicClaims>(&public, &validator).unwrap_err();
            match err {
                error::JwtVerifyError::AlgorithmRejected(e) => assert_eq!(e.declared(), alg),
                other => panic!("{alg} gave {other:?}"),
            }
        }
        Ok(())
    }

    #[test]
    fn tampered_payload_fails_signature() -> Result<()> {
        let (private, public) = signing_key()?;
        let (validator, _) = validator_at(500);
        let headers = Headers::with_key_id(jwa::SigningAlgorithm::RS256, rsa::SIGNING_KEY_ID);
        let token = Jwt::try_from_parts_with_signature(&headers, &claims(), &private)?;

        let forged_claims = serde_json::to_string(&claims().with_subject("auth0|producer"))?;
        let forged_payload = encode_segment(&forged_claims);
        let mut parts: Vec<&str> = token.as_str().split('.').collect();
        parts[1] = &forged_payload;
        let forged = Jwt::new(parts.join("."));

        let err = forged.verify::<BasicClaims>(&public, &validator).unwrap_err();
        match err {
            error::JwtVerifyError::JwkVerifyError(e) => assert!(e.is_signature_mismatch()),
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn token_signed_by_another_key_fails() -> Result<()> {
        let (_, public) = signing_key()?;
        let rogue = RsaPrivateKey::from_der(rsa::ROGUE_KEY_DER)?;
        let (validator, _) = validator_at(500);

        let headers = Headers::with_key_id(jwa::SigningAlgorithm::RS256, rsa::SIGNING_KEY_ID);
        let token = Jwt::try_from_parts_with_signature(&headers, &claims(), &rogue)?;

        let err = token.verify::<BasicClaims>(&public, &validator).unwrap_err();
        assert!(matches!(err, error::JwtVerifyError::JwkVerifyError(ref e) if e.is_signature_mismatch()));
        Ok(())
    }

    #[test]
    fn expiry_is_exclusive_and_honors_leeway() {
        let (validator, clock) = validator_at(999);
        assert_eq!(validator.validate(&claims()), Ok(()));

        clock.set(UnixTime(1_000));
        assert_eq!(
            validator.validate(&claims()),
            Err(error::ClaimsRejected::TokenExpired)
        );

        let lenient = validator.with_leeway_secs(5);
        assert_eq!(lenient.validate(&claims()), Ok(()));
        clock.set(UnixTime(1_005));
        assert_eq!(
            lenient.validate(&claims()),
            Err(error::ClaimsRejected::TokenExpired)
        );
    }

    #[test]
    fn not_before_is_checked_only_when_present() {
        let (validator, _) = validator_at(100);
        assert_eq!(validator.validate(&claims()), Ok(()));

        let early = claims().with_not_before(UnixTime(101));
        assert_eq!(
            validator.validate(&early),
            Err(error::ClaimsRejected::TokenNotYetValid)
        );

        let ready = claims().with_not_before(UnixTime(100));
        assert_eq!(validator.validate(&ready), Ok(()));
    }

    #[test]
    fn issuer_and_audience_must_match() {
        let (validator, _) = validator_at(100);

        let wrong_iss = claims().with_issuer(Issuer::from_static("https://evil.example.com/"));
        assert_eq!(
            validator.validate(&wrong_iss),
            Err(error::ClaimsRejected::InvalidIssuer)
        );

        let wrong_aud = claims().with_audience(Audience::from_static("billing"));
        assert_eq!(
            validator.validate(&wrong_aud),
            Err(error::ClaimsRejected::InvalidAudience)
        );

        let many = claims().with_audiences(vec![
            Audience::from_static("billing"),
            Audience::from_static(AUDIENCE),
        ]);
        assert_eq!(validator.validate(&many), Ok(()));
    }

    #[test]
    fn required_claims_must_be_present() {
        let (validator, _) = validator_at(100);

        let no_exp = BasicClaims::new()
            .with_issuer(Issuer::from_static(ISSUER))
            .with_audience(Audience::from_static(AUDIENCE));
        assert_eq!(
            validator.validate(&no_exp),
            Err(error::ClaimsRejected::MissingRequiredClaim("exp"))
        );

        let no_iss = BasicClaims::new()
            .with_audience(Audience::from_static(AUDIENCE))
            .with_expiration(UnixTime(1_000));
        assert_eq!(
            validator.validate(&no_iss),
            Err(error::ClaimsRejected::MissingRequiredClaim("iss"))
        );

        let no_aud = BasicClaims::new()
            .with_issuer(Issuer::from_static(ISSUER))
            .with_expiration(UnixTime(1_000));
        assert_eq!(
            validator.validate(&no_aud),
            Err(error::ClaimsRejected::MissingRequiredClaim("aud"))
        );
    }

    #[test]
    fn tokens_are_redacted_unless_asked() {
        let token = JwtRef::from_str("eyJhbGciOiJSUzI1NiJ9.e30.c2lnbmF0dXJl");

        assert_eq!(format!("{:?}", token), "***JWT***");
        assert_eq!(format!("{}", token), "***JWT***");
        assert_eq!(format!("{:#?}", token), "\"eyJhbGciOiJSUzI1NiJ9.e30.…\"");
        assert_eq!(format!("{:#5}", token), "eyJhbGciOiJSUzI1NiJ9.e30.c2ln…");
        assert_eq!(format!("{:#}", token), "eyJhbGciOiJSUzI1NiJ9.e30.c2lnbmF0dXJl");
    }
}
