#![allow(dead_code)]

pub mod rsa {
    pub const SIGNING_KEY_ID: &str = "signing-key";
    pub const SIGNING_JWK: &str = include_str!("../data/rsa/signing-jwk.json");
    pub const SIGNING_KEY_DER: &[u8] = include_bytes!("../data/rsa/signing.der");

    pub const ROGUE_KEY_ID: &str = "rogue-key";
    pub const ROGUE_JWK: &str = include_str!("../data/rsa/rogue-jwk.json");
    pub const ROGUE_KEY_DER: &[u8] = include_bytes!("../data/rsa/rogue.der");

    pub const JWKS: &str = include_str!("../data/rsa/jwks.json");
}
