//! Quick-login PINs
//!
//! Staff sign in on shared bar terminals with a short numeric PIN. Only an
//! Argon2id hash is stored, as a PHC string
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};

/// Check that `pin` is all digits and within the configured length.
pub fn validate_pin(pin: &str, config: &AccessConfig) -> AccessResult<()> {
    if pin.is_empty() || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AccessError::InvalidPin("PIN must contain only digits".to_string()));
    }

    let len = pin.len();
    if len < config.pin_min_length || len > config.pin_max_length {
        return Err(AccessError::InvalidPin(format!(
            "PIN must be {} to {} digits",
            config.pin_min_length, config.pin_max_length
        )));
    }

    Ok(())
}

/// Validate and hash a PIN with a fresh random salt.
///
/// # Examples
///
/// ```
/// use barkeep_access::{hash_pin, verify_pin, AccessConfig};
///
/// let stored = hash_pin("4821", &AccessConfig::default()).unwrap();
/// assert!(stored.starts_with("$argon2id$"));
/// assert!(verify_pin("4821", &stored));
/// assert!(!verify_pin("4822", &stored));
/// ```
pub fn hash_pin(pin: &str, config: &AccessConfig) -> AccessResult<String> {
    validate_pin(pin, config)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| AccessError::EvaluationFailed(format!("PIN hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Check `pin` against a stored PHC hash. Malformed hashes never match.
pub fn verify_pin(pin: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };

    Argon2::default()
        .verify_password(pin.as_bytes(), &parsed)
        .is_ok()
}
