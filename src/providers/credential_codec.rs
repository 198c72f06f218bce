use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};

use crate::errors::InternalError;
use crate::providers::CryptoProvider;

/// Prefix every Argon2 PHC string starts with
const HASHED_MARKER: &str = "$argon2";

/// Hashes and verifies stored credentials
///
/// Stored values are Argon2id PHC strings. Anything without the `$argon2`
/// marker is a legacy plaintext credential, compared by value until the
/// login flow replaces it with a hash.
pub struct CredentialCodec {
    pepper: String,
    params: Params,
    crypto: Arc<CryptoProvider>,
    /// Hash verified against when the username is unknown, so that path
    /// costs the same as a wrong password
    dummy_credential: String,
}

impl CredentialCodec {
    pub fn new(
        pepper: impl Into<String>,
        params: Params,
        crypto: Arc<CryptoProvider>,
    ) -> Result<Self, InternalError> {
        let mut codec = Self {
            pepper: pepper.into(),
            params,
            crypto,
            dummy_credential: String::new(),
        };
        codec.dummy_credential = codec.hash(&codec.crypto.generate_secure_password())?;
        Ok(codec)
    }

    /// Work factor from settings: memory in KiB, iterations, lanes
    pub fn params_from(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Params, InternalError> {
        Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| InternalError::crypto("argon2_params", e.to_string()))
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        if self.pepper.is_empty() {
            return Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone()));
        }

        Argon2::new_with_secret(
            self.pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Salted Argon2id hash in PHC format
    pub fn hash(&self, plain: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);

        let hash = self
            .argon2()?
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| InternalError::crypto("hash_password", e.to_string()))?
            .to_string();

        Ok(hash)
    }

    /// Check `plain` against a stored credential of either format
    ///
    /// A wrong password is `false`, never an error. A corrupt hash is logged
    /// and treated as a mismatch.
    pub fn verify(&self, plain: &str, stored: &str) -> bool {
        if Self::is_legacy_plaintext(stored) {
            return self.crypto.constant_time_eq(plain.as_bytes(), stored.as_bytes());
        }

        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored credential is not a valid PHC string: {}", e);
                return false;
            }
        };

        match self.argon2() {
            Ok(argon2) => argon2.verify_password(plain.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!("Argon2 unavailable during verification: {}", e);
                false
            }
        }
    }

    /// True when the stored value lacks the hashed-credential marker
    pub fn is_legacy_plaintext(stored: &str) -> bool {
        !stored.starts_with(HASHED_MARKER)
    }

    /// Spend one verification on a throwaway hash
    pub fn burn_verification(&self, plain: &str) {
        std::hint::black_box(self.verify(plain, &self.dummy_credential));
    }
}
