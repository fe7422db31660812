//! Password hashing and verification (Argon2 PHC strings).

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::domain::Error;

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|err| Error::internal(format!("salt generation failed: {err}")))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| Error::internal(format!("salt encoding failed: {err}")))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Verify a password against a stored PHC string.
///
/// Unparseable hashes (including the empty hash on externally-provisioned
/// accounts) never verify.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_with_matching_password() {
        let hash = hash_password("Sup3r-secret").expect("hash password");
        assert!(verify_password(&hash, "Sup3r-secret"));
        assert!(!verify_password(&hash, "sup3r-secret"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("repeatable").expect("hash password");
        let second = hash_password("repeatable").expect("hash password");
        assert_ne!(first, second);
    }

    #[test]
    fn empty_hash_never_verifies() {
        assert!(!verify_password("", "anything"));
    }
}
