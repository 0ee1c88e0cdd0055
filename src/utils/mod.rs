use bcrypt::{non_truncating_hash, non_truncating_verify};

use crate::error::AppError;

pub mod token;

pub use token::{Claims, TokenIssuer};

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Fails instead of hashing a truncated prefix when `password` is longer
/// than [`MAX_PASSWORD_BYTES`].
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    non_truncating_hash(password.as_bytes(), cost)
}

/// An over-long candidate is an error, never a prefix match.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    non_truncating_verify(password.as_bytes(), hash)
}

/// Parses a checkbox-style boolean. Anything that is not clearly on or off
/// is rejected instead of being coerced to `false`.
pub fn parse_flag(field: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::validation(format!(
            "{field} must be a boolean (1/0/true/false), got {raw:?}"
        ))),
    }
}

/// Parses a count such as bedrooms or bathrooms.
pub fn parse_count(field: &str, raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| {
            AppError::validation(format!("{field} must be a non-negative integer, got {raw:?}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_checkbox_spellings() {
        for raw in ["1", "true", "TRUE", "yes", "on", " True "] {
            assert!(parse_flag("wifi", raw).unwrap(), "{raw}");
        }
        for raw in ["0", "false", "No", "off"] {
            assert!(!parse_flag("wifi", raw).unwrap(), "{raw}");
        }
    }

    #[test]
    fn flags_reject_garbage() {
        for raw in ["2", "maybe", "tru", ""] {
            assert!(matches!(parse_flag("wifi", raw), Err(AppError::Validation(_))), "{raw}");
        }
    }

    #[test]
    fn counts_must_be_non_negative_integers() {
        assert_eq!(parse_count("bedrooms", " 3 ").unwrap(), 3);
        assert!(parse_count("bedrooms", "-1").is_err());
        assert!(parse_count("bedrooms", "2.5").is_err());
        assert!(parse_count("bedrooms", "two").is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hashed = hash_password("hunter22", 4).unwrap();
        assert_ne!(hashed, "hunter22");
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("hunter23", &hashed).unwrap());
        assert!(!verify_password("hunter2", &hashed).unwrap());
    }

    #[test]
    fn input_beyond_72_bytes_is_not_truncated() {
        let exact = "a".repeat(MAX_PASSWORD_BYTES);
        let hashed = hash_password(&exact, 4).unwrap();
        assert!(verify_password(&exact, &hashed).unwrap());

        // same first 72 bytes, different tail
        assert!(verify_password(&format!("{exact}WRONG"), &hashed).is_err());
        assert!(hash_password(&format!("{exact}tail"), 4).is_err());
    }
}
