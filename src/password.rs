use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

use crate::config::HashConfig;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("invalid argon2 work factor: {0}")]
    Params(argon2::Error),
    #[error("argon2 hash_password error: {0}")]
    Hash(password_hash::Error),
    #[error("malformed password hash: {0}")]
    Malformed(password_hash::Error),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Argon2id hasher with a fixed work factor.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(cfg: &HashConfig) -> Result<Self, HashingError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| {
                error!(error = %e, ?cfg, "argon2 params rejected");
                HashingError::Params(e)
            })?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Salted PHC string for `plain`.
    pub fn hash(&self, plain: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                HashingError::Hash(e)
            })?
            .to_string();
        Ok(hash)
    }

    /// Runs [`hash`](Self::hash) on the blocking pool so the work factor
    /// does not stall the async workers.
    pub async fn hash_blocking(&self, plain: String) -> Result<String, HashingError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            HashingError::Malformed(e)
        })?;
        // the stored hash carries its own params; ours only pick the algorithm family
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError::Hash(e)),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> CredentialHasher {
    CredentialHasher::new(&HashConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("minimal argon2 params are valid")
}
