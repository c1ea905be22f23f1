use std::collections::HashMap;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::models::Principal;
use crate::config::UserSeed;
use crate::error::AppError;

#[derive(Debug, Clone)]
struct StoredUser {
    principal: Principal,
    password_sha256: String,
}

/// Read-only user lookup backing the bundled guard, seeded from config.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_email: HashMap<String, StoredUser>,
    email_by_id: HashMap<Uuid, String>,
}

impl UserDirectory {
    pub fn from_seeds(seeds: &[UserSeed]) -> Result<Self, AppError> {
        let mut directory = Self::default();

        for seed in seeds {
            let email = normalize_email(&seed.email);
            let digest = seed.password_sha256.trim().to_ascii_lowercase();

            if email.is_empty() {
                return Err(AppError::ConfigError(format!("user {} has an empty email", seed.id)));
            }
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(AppError::ConfigError(format!(
                    "user {} must have a hex encoded SHA-256 password digest",
                    email
                )));
            }
            if directory.by_email.contains_key(&email) || directory.email_by_id.contains_key(&seed.id) {
                return Err(AppError::ConfigError(format!("duplicate user {}", email)));
            }

            directory.email_by_id.insert(seed.id, email.clone());
            directory.by_email.insert(
                email,
                StoredUser {
                    principal: Principal {
                        id: seed.id,
                        name: seed.name.clone(),
                        email: seed.email.trim().to_string(),
                    },
                    password_sha256: digest,
                },
            );
        }

        Ok(directory)
    }

    /// Returns the user if `email` is known and `password` matches.
    pub fn verify(&self, email: &str, password: &str) -> Option<&Principal> {
        let user = self.by_email.get(&normalize_email(email))?;
        let digest = password_digest(password);
        let matches: bool = digest.as_bytes().ct_eq(user.password_sha256.as_bytes()).into();
        matches.then_some(&user.principal)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Option<&Principal> {
        let email = self.email_by_id.get(id)?;
        self.by_email.get(email).map(|user| &user.principal)
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

/// Lowercase hex SHA-256 of a password, the format `password_sha256` is configured in.
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
