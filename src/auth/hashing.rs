//! Password hashing and verification.
//!
//! Argon2id with a random per-call salt embedded in the PHC digest. A
//! mismatch is an `Ok(false)`, never an error; a malformed stored digest is
//! surfaced as an internal error because it indicates corrupted data, not a
//! bad login attempt.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::{Error, Result};

fn password_hasher() -> Argon2<'static> {
    // Tuned for interactive API calls: Argon2id with moderate memory and a single iteration
    // keeps verification under 10ms on development hardware while retaining side-channel
    // protections.
    const MEMORY_COST_KIB: u32 = 768;
    const ITERATIONS: u32 = 1;
    const PARALLELISM: u32 = 1;
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, Some(32))
        .expect("valid Argon2 parameters");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a plaintext password into a PHC-format digest with a fresh salt.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    password_hasher()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|err| Error::internal(format!("Failed to hash password: {}", err)))
}

/// Verify a plaintext password against a stored digest.
///
/// Returns `Ok(false)` on mismatch. Fails only when the stored digest cannot
/// be parsed, which means the row is corrupt or was written by a
/// misconfigured deployment.
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|err| Error::internal(format!("Malformed password digest: {}", err)))?;

    match password_hasher().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(Error::internal(format!("Password verification failed: {}", err))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let digest = hash_password("pw123").expect("hash password");
        assert!(verify_password("pw123", &digest).expect("verify"));
    }

    #[test]
    fn wrong_password_is_rejected_without_error() {
        let digest = hash_password("correct horse").expect("hash password");
        assert!(!verify_password("battery staple", &digest).expect("verify"));
    }

    #[test]
    fn salts_are_random_per_call() {
        let first = hash_password("same-input").expect("hash");
        let second = hash_password("same-input").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_digest_is_an_internal_error() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
