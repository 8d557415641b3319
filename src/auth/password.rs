use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

// Roughly the work of bcrypt cost 10 on commodity hardware.
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing unavailable: {0}")]
    Unavailable(String),
    #[error("stored password digest is malformed")]
    MalformedDigest,
}

/// Whether a presented password matches a stored digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
}

fn hasher() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None).map_err(|e| {
        error!(error = %e, "argon2 params rejected");
        CredentialError::Unavailable(e.to_string())
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Produces a self-describing PHC digest (algorithm, version, cost, salt, output).
pub fn hash_password(plain: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            CredentialError::Unavailable(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks `plain` against `digest`. Argon2 digests are verified with the
/// parameters embedded in them; bcrypt digests from older rows are accepted too.
pub fn verify_password(digest: &str, plain: &str) -> Result<Verification, CredentialError> {
    if is_bcrypt(digest) {
        return match bcrypt::verify(plain, digest) {
            Ok(true) => Ok(Verification::Match),
            Ok(false) => Ok(Verification::Mismatch),
            // verify only fails on digests it cannot parse
            Err(_) => Err(CredentialError::MalformedDigest),
        };
    }

    let parsed = PasswordHash::new(digest).map_err(|_| CredentialError::MalformedDigest)?;
    match hasher()?.verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(Verification::Match),
        Err(argon2::password_hash::Error::Password) => Ok(Verification::Mismatch),
        Err(e) => {
            error!(error = %e, "argon2 verify error");
            Err(CredentialError::Unavailable(e.to_string()))
        }
    }
}

fn is_bcrypt(digest: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| digest.starts_with(prefix))
}

/// Runs [`hash_password`] off the async worker threads.
pub async fn hash_password_blocking(plain: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| CredentialError::Unavailable(e.to_string()))?
}

/// Runs [`verify_password`] off the async worker threads.
pub async fn verify_password_blocking(
    digest: String,
    plain: String,
) -> Result<Verification, CredentialError> {
    tokio::task::spawn_blocking(move || verify_password(&digest, &plain))
        .await
        .map_err(|e| CredentialError::Unavailable(e.to_string()))?
}
