/// One-time login code utilities
///
/// The portal is passwordless: signing in issues a short-lived 6-digit code
/// delivered out of band (email or SMS, handled by the frontend providers).
/// Only the SHA-256 hash of a code is ever stored; see
/// [`crate::models::verification_token`] for the persistence side.
///
/// # Security
///
/// - **Generation**: `rand::thread_rng` (OS-seeded CSPRNG)
/// - **Storage**: SHA-256 hex digest, never the plaintext code
/// - **Lifetime**: 10 minutes, single use
///
/// # Example
///
/// ```
/// use consulat_shared::auth::otp::{generate_code, hash_code, verify_code};
///
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
///
/// let stored_hash = hash_code(&code);
/// assert!(verify_code(&code, &stored_hash));
/// assert!(!verify_code("000000", &stored_hash) || code == "000000");
/// ```

use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};

/// How long an issued code stays valid
pub const CODE_TTL_MINUTES: i64 = 10;

/// Number of digits in a login code
pub const CODE_LENGTH: usize = 6;

/// Gets the code lifetime as a chrono duration
pub fn code_ttl() -> Duration {
    Duration::minutes(CODE_TTL_MINUTES)
}

/// Generates a random 6-digit login code
///
/// Codes are zero-padded, so "004217" is a valid code. The keyspace is
/// small by design (the code expires in 10 minutes and is single use).
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let value: u32 = rng.gen_range(0..1_000_000);
    format!("{:06}", value)
}

/// Hashes a login code with SHA-256 for storage
///
/// Returns the lowercase hex digest. The hash is what gets persisted in
/// `verification_tokens`; lookups re-hash the submitted code and compare
/// in SQL.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verifies a submitted code against a stored hash
pub fn verify_code(code: &str, stored_hash: &str) -> bool {
    hash_code(code) == stored_hash
}

/// Validates the shape of a submitted code (6 ASCII digits)
///
/// Used to reject obviously malformed input before touching the database.
pub fn validate_code_format(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_hash_code_is_stable() {
        assert_eq!(hash_code("123456"), hash_code("123456"));
        assert_ne!(hash_code("123456"), hash_code("123457"));
    }

    #[test]
    fn test_hash_code_is_hex_digest() {
        let hash = hash_code("000000");
        assert_eq!(hash.len(), 64); // SHA-256 hex
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_code() {
        let code = generate_code();
        let stored = hash_code(&code);

        assert!(verify_code(&code, &stored));
        assert!(!verify_code("999999", &hash_code("123456")));
    }

    #[test]
    fn test_validate_code_format() {
        assert!(validate_code_format("123456"));
        assert!(validate_code_format("000000"));

        assert!(!validate_code_format("12345")); // too short
        assert!(!validate_code_format("1234567")); // too long
        assert!(!validate_code_format("12345a")); // non-digit
        assert!(!validate_code_format("12 456")); // whitespace
        assert!(!validate_code_format("")); // empty
    }
}
