use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 经销商数据库实体
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Dealer {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDealer {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
