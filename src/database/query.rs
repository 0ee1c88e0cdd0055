//! Composition of the public listing query.
//!
//! A [`PropertyQuery`] is rendered two ways: as parameterised SQL for
//! Postgres and as an in-process predicate for the memory store. Both must
//! select the same rows in the same order.

use sqlx::{Postgres, QueryBuilder};

use super::models::property::Property;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const PROPERTY_COLUMNS: &str = "id, dealer_id, name, location, image, bedrooms, bathrooms, \
    kitchen, ac, wifi, parking, food, created_at";

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    pub bedrooms: Option<i32>,
    pub kitchen: Option<bool>,
    pub wifi: Option<bool>,
    pub parking: Option<bool>,
    pub food: Option<bool>,
    search: Option<String>,
    page: i64,
    limit: i64,
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self {
            bedrooms: None,
            kitchen: None,
            wifi: None,
            parking: None,
            food: None,
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PropertyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty search text is ignored. The text is matched as given,
    /// surrounding whitespace included, but case-insensitively.
    pub fn search(mut self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        self.search = (!text.is_empty()).then(|| text.to_lowercase());
        self
    }

    /// `page` is clamped to at least 1 and `limit` into `1..=MAX_PAGE_SIZE`.
    /// Callers that want to reject bad input do so before getting here.
    pub fn paginate(mut self, page: i64, limit: i64) -> Self {
        self.page = page.max(1);
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Renders `SELECT ... WHERE 1=1 [AND ...] ORDER BY id LIMIT .. OFFSET ..`.
    pub fn to_sql(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE 1=1"
        ));

        if let Some(bedrooms) = self.bedrooms {
            builder.push(" AND bedrooms = ").push_bind(bedrooms);
        }
        for (column, value) in self.flag_filters() {
            if let Some(value) = value {
                builder
                    .push(format!(" AND {column} = "))
                    .push_bind(value);
            }
        }
        if let Some(search) = &self.search {
            // strpos keeps the match literal, so % and _ carry no meaning
            builder
                .push(" AND (strpos(LOWER(name), ")
                .push_bind(search.clone())
                .push(") > 0 OR strpos(LOWER(location), ")
                .push_bind(search.clone())
                .push(") > 0)");
        }

        builder
            .push(" ORDER BY id LIMIT ")
            .push_bind(self.limit)
            .push(" OFFSET ")
            .push_bind(self.offset());
        builder
    }

    /// The same filter, applied to an already loaded row.
    pub fn matches(&self, property: &Property) -> bool {
        if self.bedrooms.is_some_and(|b| b != property.bedrooms) {
            return false;
        }
        let actual = [
            property.kitchen,
            property.wifi,
            property.parking,
            property.food,
        ];
        for ((_, wanted), actual) in self.flag_filters().into_iter().zip(actual) {
            if wanted.is_some_and(|w| w != actual) {
                return false;
            }
        }
        match &self.search {
            Some(search) => {
                property.name.to_lowercase().contains(search.as_str())
                    || property.location.to_lowercase().contains(search.as_str())
            }
            None => true,
        }
    }

    fn flag_filters(&self) -> [(&'static str, Option<bool>); 4] {
        [
            ("kitchen", self.kitchen),
            ("wifi", self.wifi),
            ("parking", self.parking),
            ("food", self.food),
        ]
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn property(name: &str, location: &str, bedrooms: i32, wifi: bool) -> Property {
        Property {
            id: 1,
            dealer_id: 1,
            name: name.into(),
            location: location.into(),
            image: None,
            bedrooms,
            bathrooms: 1,
            kitchen: false,
            ac: false,
            wifi,
            parking: false,
            food: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn unfiltered_query_matches_all_with_default_page() {
        let query = PropertyQuery::new();
        assert_eq!(
            query.to_sql().sql(),
            "SELECT id, dealer_id, name, location, image, bedrooms, bathrooms, kitchen, ac, \
             wifi, parking, food, created_at FROM properties WHERE 1=1 ORDER BY id LIMIT $1 OFFSET $2"
        );
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 0);
        assert!(query.matches(&property("Any", "Where", 5, false)));
    }

    #[test]
    fn present_filters_become_and_predicates() {
        let query = PropertyQuery {
            bedrooms: Some(2),
            wifi: Some(true),
            ..PropertyQuery::new()
        };
        let builder = query.to_sql();
        let sql = builder.sql();
        assert!(sql.contains("WHERE 1=1 AND bedrooms = $1 AND wifi = $2 ORDER BY id"));
        assert!(!sql.contains("kitchen ="));
        assert!(!sql.contains("strpos"));
        assert!(sql.ends_with("LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn search_is_an_or_over_name_and_location() {
        let query = PropertyQuery::new().search("Lake");
        let builder = query.to_sql();
        assert!(builder.sql().contains(
            "AND (strpos(LOWER(name), $1) > 0 OR strpos(LOWER(location), $2) > 0)"
        ));
        assert_eq!(query.search_text(), Some("lake"));
    }

    #[test]
    fn empty_search_is_ignored() {
        assert_eq!(PropertyQuery::new().search("").search_text(), None);
    }

    #[test]
    fn search_whitespace_is_significant() {
        let query = PropertyQuery::new().search("view ");
        assert_eq!(query.search_text(), Some("view "));
        assert!(!query.matches(&property("Lakeview", "Pune", 1, false)));
        assert!(query.matches(&property("Lakeview Villa", "Pune", 1, false)));
    }

    #[test]
    fn pagination_offset_and_clamping() {
        let query = PropertyQuery::new().paginate(2, 20);
        assert_eq!(query.offset(), 20);

        let query = PropertyQuery::new().paginate(0, 1000);
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn predicate_requires_every_filter() {
        let query = PropertyQuery {
            bedrooms: Some(2),
            wifi: Some(true),
            ..PropertyQuery::new()
        };
        assert!(query.matches(&property("A", "B", 2, true)));
        assert!(!query.matches(&property("A", "B", 2, false)));
        assert!(!query.matches(&property("A", "B", 3, true)));
    }

    #[test]
    fn predicate_search_is_case_insensitive_on_name_or_location() {
        let query = PropertyQuery::new().search("lakeview");
        assert!(query.matches(&property("Lakeview Villa", "Pune", 1, false)));
        assert!(query.matches(&property("Villa", "LAKEVIEW road", 1, false)));
        assert!(!query.matches(&property("Hillside", "Pune", 1, false)));

        let wildcard = PropertyQuery::new().search("%");
        assert!(!wildcard.matches(&property("Hillside", "Pune", 1, false)));
    }
}
