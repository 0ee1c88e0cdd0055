use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{
    Dealer, DealerRepository, NewDealer, Property, PropertyFields, PropertyQuery,
    PropertyRepository, StoreError,
};

/// Postgres-backed store for dealers and properties.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        other => StoreError::Database(other),
    }
}

fn affected_or_not_found(rows: u64) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFoundOrNotOwned)
    } else {
        Ok(())
    }
}

#[async_trait]
impl DealerRepository for PgStore {
    async fn insert(&self, dealer: NewDealer) -> Result<Dealer, StoreError> {
        let dealer = sqlx::query_as::<_, Dealer>(
            r#"
            INSERT INTO dealers (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(&dealer.name)
        .bind(&dealer.email)
        .bind(&dealer.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!("Registered dealer {}", dealer.id);
        Ok(dealer)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Dealer>, StoreError> {
        let dealer = sqlx::query_as::<_, Dealer>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM dealers
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dealer)
    }
}

#[async_trait]
impl PropertyRepository for PgStore {
    async fn create(
        &self,
        dealer_id: i64,
        fields: &PropertyFields,
        image: Option<&str>,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO properties
                (dealer_id, name, location, image, bedrooms, bathrooms, kitchen, ac, wifi, parking, food)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(dealer_id)
        .bind(&fields.name)
        .bind(&fields.location)
        .bind(image)
        .bind(fields.bedrooms)
        .bind(fields.bathrooms)
        .bind(fields.kitchen)
        .bind(fields.ac)
        .bind(fields.wifi)
        .bind(fields.parking)
        .bind(fields.food)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_by_dealer(&self, dealer_id: i64) -> Result<Vec<Property>, StoreError> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT id, dealer_id, name, location, image, bedrooms, bathrooms,
                   kitchen, ac, wifi, parking, food, created_at
            FROM properties
            WHERE dealer_id = $1
            ORDER BY id
            "#,
        )
        .bind(dealer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn search(&self, query: &PropertyQuery) -> Result<Vec<Property>, StoreError> {
        let mut builder = query.to_sql();
        tracing::debug!(sql = builder.sql(), "Searching properties");

        let properties = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn update(
        &self,
        id: i64,
        dealer_id: i64,
        fields: &PropertyFields,
        image: Option<&str>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET name = $1, location = $2, image = COALESCE($3, image),
                bedrooms = $4, bathrooms = $5, kitchen = $6, ac = $7,
                wifi = $8, parking = $9, food = $10
            WHERE id = $11 AND dealer_id = $12
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.location)
        .bind(image)
        .bind(fields.bedrooms)
        .bind(fields.bathrooms)
        .bind(fields.kitchen)
        .bind(fields.ac)
        .bind(fields.wifi)
        .bind(fields.parking)
        .bind(fields.food)
        .bind(id)
        .bind(dealer_id)
        .execute(&self.pool)
        .await?;

        affected_or_not_found(result.rows_affected())
    }

    async fn delete(&self, id: i64, dealer_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1 AND dealer_id = $2")
            .bind(id)
            .bind(dealer_id)
            .execute(&self.pool)
            .await?;

        affected_or_not_found(result.rows_affected())
    }
}
