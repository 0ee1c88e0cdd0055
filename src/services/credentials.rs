use std::sync::Arc;

use crate::database::{DealerRepository, NewDealer};
use crate::error::{AppError, AuthError};
use crate::utils::{MAX_PASSWORD_BYTES, hash_password, verify_password};

/// Dealer registration and password verification on top of a
/// [`DealerRepository`]. Hashing runs on the blocking pool.
pub struct CredentialStore {
    dealers: Arc<dyn DealerRepository>,
    cost: u32,
    // verified against when the email is unknown, so both failure paths cost a bcrypt round
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(dealers: Arc<dyn DealerRepository>, cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash_password("not-a-real-password", cost)?;
        Ok(Self {
            dealers,
            cost,
            dummy_hash,
        })
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<i64, AppError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("a valid email is required"));
        }
        if password.is_empty() {
            return Err(AppError::validation("password is required"));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::validation(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        let password = password.to_owned();
        let cost = self.cost;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

        let dealer = self
            .dealers
            .insert(NewDealer {
                name: name.to_owned(),
                email,
                password_hash,
            })
            .await?;

        Ok(dealer.id)
    }

    pub async fn verify(&self, email: &str, password: &str) -> Result<i64, AppError> {
        let dealer = self.dealers.find_by_email(&normalize_email(email)).await?;

        let (dealer_id, hash) = match dealer {
            Some(dealer) => (Some(dealer.id), dealer.password_hash),
            None => (None, self.dummy_hash.clone()),
        };
        let password = password.to_owned();
        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await?
            .unwrap_or_else(|e| {
                // over-long candidates land here as well as corrupt hashes
                tracing::debug!("Password verification error: {}", e);
                false
            });

        match dealer_id {
            Some(id) if matched => Ok(id),
            _ => Err(AuthError::InvalidCredentials.into()),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
