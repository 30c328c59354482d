//! # auth-adapters
//!
//! Argon2id implementation of the [`PasswordHasher`] port.
//! Hashes are self-describing PHC strings, so parameters can be raised
//! later without invalidating stored accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher as _, SaltString};
use argon2::Argon2;
use domains::{DomainError, DomainResult, PasswordHasher};

#[derive(Default)]
pub struct Argon2Hasher {
    argon: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))
    }
}
