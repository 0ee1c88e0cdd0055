use serde::{Deserialize, Serialize};

use crate::database::PropertyQuery;
use crate::database::query::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::error::AppError;
use crate::utils::{parse_count, parse_flag};

/// Raw query string of `GET /properties`. Everything arrives as text so the
/// validation errors can name the offending parameter.
#[derive(Debug, Default, Deserialize)]
pub struct ListPropertiesParams {
    pub bedrooms: Option<String>,
    pub kitchen: Option<String>,
    pub wifi: Option<String>,
    pub parking: Option<String>,
    pub food: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_positive(field: &str, raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| AppError::validation(format!("{field} must be an integer >= 1, got {raw:?}"))),
    }
}

impl TryFrom<ListPropertiesParams> for PropertyQuery {
    type Error = AppError;

    fn try_from(params: ListPropertiesParams) -> Result<Self, Self::Error> {
        let flag = |name: &str, raw: &Option<String>| {
            present(raw).map(|v| parse_flag(name, v)).transpose()
        };

        let page = parse_positive("page", present(&params.page), DEFAULT_PAGE)?;
        let limit = parse_positive("limit", present(&params.limit), DEFAULT_PAGE_SIZE)?;

        let mut query = PropertyQuery::new();
        query.bedrooms = present(&params.bedrooms)
            .map(|v| parse_count("bedrooms", v))
            .transpose()?;
        query.kitchen = flag("kitchen", &params.kitchen)?;
        query.wifi = flag("wifi", &params.wifi)?;
        query.parking = flag("parking", &params.parking)?;
        query.food = flag("food", &params.food)?;

        Ok(query
            .search(params.search.unwrap_or_default())
            .paginate(page, limit))
    }
}
