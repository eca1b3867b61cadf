use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use error_stack::{Report, Result, ResultExt};
use once_cell::sync::Lazy;
use thiserror::Error;

static CONTEXT: Lazy<Argon2<'static>> = Lazy::new(|| {
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::default(),
    )
});

#[derive(Debug, Error)]
#[error("Failed to generate password hash")]
pub struct HashPasswordError;

/// Hashes a password into a PHC string with argon2id. Deliberately
/// CPU-heavy; call it through `spawn_blocking` on async paths.
pub fn hash(password: &str) -> Result<String, HashPasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = CONTEXT
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Report::new(HashPasswordError).attach_printable(e.to_string()))?;

    Ok(password_hash.to_string())
}

#[derive(Debug, Error)]
#[error("Failed to verify password")]
pub struct VerifyPasswordError;

/// Checks a password attempt against a stored PHC string. A mismatch
/// is `Ok(false)`; only unparseable hashes and backend failures error.
pub fn verify(password: &str, hash: &str) -> Result<bool, VerifyPasswordError> {
    let hash = PasswordHash::new(hash)
        .map_err(|e| Report::new(VerifyPasswordError).attach_printable(e.to_string()))
        .attach_printable("could not parse password hash")?;

    match CONTEXT.verify_password(password.as_bytes(), &hash) {
        Ok(..) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => {
            Err(Report::new(VerifyPasswordError).attach_printable(error.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash("correct horse battery staple").expect("hash");
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify("correct horse battery staple", &hash).expect("verify"));
        assert!(!verify("incorrect horse", &hash).expect("verify"));
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let first = hash("hunter2hunter2").expect("hash");
        let second = hash("hunter2hunter2").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn garbage_stored_hash_is_an_error_not_a_mismatch() {
        assert!(verify("whatever", "not-a-phc-string").is_err());
    }
}
