use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::database::{
    Dealer, DealerRepository, NewDealer, Property, PropertyFields, PropertyQuery,
    PropertyRepository, StoreError,
};

/// In-process store with the same semantics as [`super::PgStore`].
/// Rows are kept in insertion order, ids are assigned monotonically.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    dealers: Vec<Dealer>,
    properties: Vec<Property>,
    next_dealer_id: i64,
    next_property_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DealerRepository for MemoryStore {
    async fn insert(&self, dealer: NewDealer) -> Result<Dealer, StoreError> {
        let mut tables = self.tables();
        if tables.dealers.iter().any(|d| d.email == dealer.email) {
            return Err(StoreError::DuplicateEmail);
        }

        tables.next_dealer_id += 1;
        let dealer = Dealer {
            id: tables.next_dealer_id,
            name: dealer.name,
            email: dealer.email,
            password_hash: dealer.password_hash,
            created_at: Utc::now(),
        };
        tables.dealers.push(dealer.clone());
        Ok(dealer)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Dealer>, StoreError> {
        Ok(self.tables().dealers.iter().find(|d| d.email == email).cloned())
    }
}

#[async_trait]
impl PropertyRepository for MemoryStore {
    async fn create(
        &self,
        dealer_id: i64,
        fields: &PropertyFields,
        image: Option<&str>,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables();
        tables.next_property_id += 1;
        let mut property = Property {
            id: tables.next_property_id,
            dealer_id,
            name: String::new(),
            location: String::new(),
            image: image.map(str::to_owned),
            bedrooms: 0,
            bathrooms: 0,
            kitchen: false,
            ac: false,
            wifi: false,
            parking: false,
            food: false,
            created_at: Utc::now(),
        };
        property.apply(fields);
        tables.properties.push(property);
        Ok(tables.next_property_id)
    }

    async fn list_by_dealer(&self, dealer_id: i64) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .tables()
            .properties
            .iter()
            .filter(|p| p.dealer_id == dealer_id)
            .cloned()
            .collect())
    }

    async fn search(&self, query: &PropertyQuery) -> Result<Vec<Property>, StoreError> {
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(0);

        Ok(self
            .tables()
            .properties
            .iter()
            .filter(|p| query.matches(p))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        dealer_id: i64,
        fields: &PropertyFields,
        image: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let property = tables
            .properties
            .iter_mut()
            .find(|p| p.id == id && p.dealer_id == dealer_id)
            .ok_or(StoreError::NotFoundOrNotOwned)?;

        property.apply(fields);
        if let Some(image) = image {
            property.image = Some(image.to_owned());
        }
        Ok(())
    }

    async fn delete(&self, id: i64, dealer_id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let before = tables.properties.len();
        tables
            .properties
            .retain(|p| !(p.id == id && p.dealer_id == dealer_id));

        if tables.properties.len() == before {
            return Err(StoreError::NotFoundOrNotOwned);
        }
        Ok(())
    }
}
