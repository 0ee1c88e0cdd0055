use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sqlx::FromRow;

/// 房源数据库实体
///
/// Amenity flags are booleans in storage and `0`/`1` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Property {
    pub id: i64,
    pub dealer_id: i64,
    pub name: String,
    pub location: String,
    pub image: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    #[serde(serialize_with = "as_flag")]
    pub kitchen: bool,
    #[serde(serialize_with = "as_flag")]
    pub ac: bool,
    #[serde(serialize_with = "as_flag")]
    pub wifi: bool,
    #[serde(serialize_with = "as_flag")]
    pub parking: bool,
    #[serde(serialize_with = "as_flag")]
    pub food: bool,
    pub created_at: DateTime<Utc>,
}

/// The dealer-editable part of a property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFields {
    pub name: String,
    pub location: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub kitchen: bool,
    pub ac: bool,
    pub wifi: bool,
    pub parking: bool,
    pub food: bool,
}

impl Property {
    pub fn fields(&self) -> PropertyFields {
        PropertyFields {
            name: self.name.clone(),
            location: self.location.clone(),
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            kitchen: self.kitchen,
            ac: self.ac,
            wifi: self.wifi,
            parking: self.parking,
            food: self.food,
        }
    }

    pub(crate) fn apply(&mut self, fields: &PropertyFields) {
        self.name = fields.name.clone();
        self.location = fields.location.clone();
        self.bedrooms = fields.bedrooms;
        self.bathrooms = fields.bathrooms;
        self.kitchen = fields.kitchen;
        self.ac = fields.ac;
        self.wifi = fields.wifi;
        self.parking = fields.parking;
        self.food = fields.food;
    }

    /// Rewrites the stored relative image path into an absolute URL.
    pub fn with_image_url(mut self, base_url: &str) -> Self {
        self.image = self
            .image
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}/{}", base_url.trim_end_matches('/'), path));
        self
    }
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Property {
        Property {
            id: 1,
            dealer_id: 9,
            name: "Lakeview".into(),
            location: "Pune".into(),
            image: Some("uploads/1700000000000.jpg".into()),
            bedrooms: 2,
            bathrooms: 1,
            kitchen: true,
            ac: false,
            wifi: true,
            parking: false,
            food: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn flags_serialize_as_integers() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kitchen"], 1);
        assert_eq!(json["ac"], 0);
        assert_eq!(json["wifi"], 1);
        assert_eq!(json["bedrooms"], 2);
    }

    #[test]
    fn image_url_is_absolute() {
        let property = sample().with_image_url("http://example.com:5000/");
        assert_eq!(
            property.image.as_deref(),
            Some("http://example.com:5000/uploads/1700000000000.jpg")
        );

        let mut bare = sample();
        bare.image = Some(String::new());
        assert_eq!(bare.with_image_url("http://example.com").image, None);
    }
}
