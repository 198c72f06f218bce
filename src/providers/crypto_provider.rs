use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::types::internal::SessionToken;

/// Random bytes in a session token (256 bits)
const SESSION_TOKEN_BYTES: usize = 32;

/// Token minting, digests and generated passwords
pub struct CryptoProvider;

impl CryptoProvider {
    pub fn new() -> Self {
        Self
    }

    /// Fresh bearer token from the thread-local CSPRNG, base64url without padding
    pub fn generate_session_token(&self) -> SessionToken {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        SessionToken::new(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// SHA-256 of a token as lowercase hex; this is what gets stored
    pub fn hash_token(&self, token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }

    /// Equality whose running time does not depend on where inputs differ
    ///
    /// Both sides are digested first so length differences do not leak either.
    pub fn constant_time_eq(&self, a: &[u8], b: &[u8]) -> bool {
        let a = Sha256::digest(a);
        let b = Sha256::digest(b);
        bool::from(a.as_slice().ct_eq(b.as_slice()))
    }

    /// 20-character random password with at least one letter and one digit
    pub fn generate_secure_password(&self) -> String {
        const PASSWORD_LENGTH: usize = 20;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                 abcdefghijklmnopqrstuvwxyz\
                                 0123456789\
                                 !@#$%^&*()_+-=[]{}|;:,.<>?";

        let mut rng = rand::rng();
        loop {
            let password: String = (0..PASSWORD_LENGTH)
                .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
                .collect();

            if password.chars().any(|c| c.is_ascii_alphabetic())
                && password.chars().any(|c| c.is_ascii_digit())
            {
                return password;
            }
        }
    }
}

impl Default for CryptoProvider {
    fn default() -> Self {
        Self::new()
    }
}
