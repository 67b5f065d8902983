// Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Hash a password with Argon2id and a fresh random salt.
///
/// Two calls on the same input produce different digests; both verify.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored digest.
///
/// Returns false on mismatch and on malformed or foreign digests; this
/// function never fails.
pub fn verify_password(password: &str, hash: &str) -> bool {
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
    fn hash_then_verify_roundtrips() {
        let hash = hash_password("TestPass123!").unwrap();

        assert!(!hash.is_empty());
        assert!(verify_password("TestPass123!", &hash));
        assert!(!verify_password("WrongPassword!", &hash));
    }

    #[test]
    fn same_password_hashes_differently_but_both_verify() {
        let first = hash_password("same_password").unwrap();
        let second = hash_password("same_password").unwrap();

        // Fresh salt per call
        assert_ne!(first, second);
        assert!(verify_password("same_password", &first));
        assert!(verify_password("same_password", &second));
    }

    #[test]
    fn different_passwords_never_cross_verify() {
        let hash = hash_password("password_one").unwrap();
        assert!(!verify_password("password_two", &hash));
    }

    #[test]
    fn malformed_digests_verify_to_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$2b$12$notargon2atall..."));
    }
}
