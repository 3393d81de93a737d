use crate::error::AppError;
use bcrypt::{hash, verify};

/// Bcrypt work factor used for stored password hashes.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a candidate password against a stored bcrypt hash.
///
/// Bcrypt's verify is constant-time with respect to the candidate, so a
/// mismatch takes as long as a match.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "secret123";
        let hashed = hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        match verify_password("secret123", "not-a-bcrypt-hash") {
            Err(AppError::InternalServerError(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            // Some bcrypt versions report a malformed hash as a plain
            // mismatch rather than an error.
            Ok(false) => {}
            Ok(true) => panic!("verification must not succeed on a malformed hash"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }
}
