use std::sync::Arc;

use config::Config;
use database::{DealerRepository, PropertyRepository};
use error::AppError;
use services::{CredentialStore, UploadStore};
use utils::TokenIssuer;

pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub credentials: Arc<CredentialStore>,
    pub properties: Arc<dyn PropertyRepository>,
    pub tokens: Arc<TokenIssuer>,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    /// Wires the services around the given stores. The signing key is
    /// derived from `config.jwt_secret` here and nowhere else.
    pub fn new(
        config: Config,
        dealers: Arc<dyn DealerRepository>,
        properties: Arc<dyn PropertyRepository>,
    ) -> Result<Self, AppError> {
        let ttl = config.jwt_ttl()?;

        Ok(Self {
            credentials: Arc::new(CredentialStore::new(dealers, config.bcrypt_cost)?),
            properties,
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret, ttl)),
            uploads: Arc::new(UploadStore::new(config.upload_dir.clone())),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("s".into()),
            "BCRYPT_COST" => Some("4".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn fresh_tokens_verify() {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config(), store.clone(), store).unwrap();
        let token = state.tokens.issue(1).unwrap();
        assert_eq!(state.tokens.verify(Some(token.as_str())).unwrap().dealer_id, 1);
    }

    #[test]
    fn unrepresentable_token_lifetime_is_an_error() {
        for secs in [u64::MAX, 10_000_000_000_000_000] {
            let mut config = config();
            config.jwt_expiration_secs = secs;
            let store = Arc::new(MemoryStore::new());
            let state = AppState::new(config, store.clone(), store);
            assert!(matches!(state, Err(AppError::Config(_))), "{secs}");
        }
    }
}
