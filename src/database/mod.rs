// 数据库模块
// 实体定义、查询构建以及仓储实现

use async_trait::async_trait;

pub mod models;
pub mod query;
pub mod repositories;

pub use models::dealer::{Dealer, NewDealer};
pub use models::property::{Property, PropertyFields};
pub use query::PropertyQuery;
pub use repositories::{MemoryStore, PgStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("property not found or not owned by dealer")]
    NotFoundOrNotOwned,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Dealer identities and their password hashes.
#[async_trait]
pub trait DealerRepository: Send + Sync {
    /// Fails with [`StoreError::DuplicateEmail`] when the email is taken.
    async fn insert(&self, dealer: NewDealer) -> Result<Dealer, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Dealer>, StoreError>;
}

/// Property listings. Every write is scoped by the owning dealer: a
/// mismatched owner behaves exactly like a missing row.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create(
        &self,
        dealer_id: i64,
        fields: &PropertyFields,
        image: Option<&str>,
    ) -> Result<i64, StoreError>;

    async fn list_by_dealer(&self, dealer_id: i64) -> Result<Vec<Property>, StoreError>;

    async fn search(&self, query: &PropertyQuery) -> Result<Vec<Property>, StoreError>;

    /// Keeps the stored image when `image` is `None`.
    async fn update(
        &self,
        id: i64,
        dealer_id: i64,
        fields: &PropertyFields,
        image: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, id: i64, dealer_id: i64) -> Result<(), StoreError>;
}
