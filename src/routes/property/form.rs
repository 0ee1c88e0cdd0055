use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::database::PropertyFields;
use crate::error::AppError;
use crate::utils::{parse_count, parse_flag};

const IMAGE_FIELD: &str = "image";

pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A parsed `multipart/form-data` property submission.
pub struct PropertyForm {
    pub fields: PropertyFields,
    pub image: Option<ImageUpload>,
}

impl PropertyForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut text = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                // an untouched file input still submits an empty part
                if !bytes.is_empty() {
                    image = Some(ImageUpload { file_name, bytes });
                }
            } else {
                text.insert(name, field.text().await?);
            }
        }

        Ok(Self {
            fields: parse_fields(&text)?,
            image,
        })
    }
}

fn parse_fields(text: &HashMap<String, String>) -> Result<PropertyFields, AppError> {
    let value = |key: &str| text.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
    let required = |key: &str| {
        value(key).ok_or_else(|| AppError::validation(format!("{key} is required")))
    };
    // unchecked checkboxes are simply not submitted
    let flag = |key: &str| value(key).map_or(Ok(false), |v| parse_flag(key, v));

    Ok(PropertyFields {
        name: required("name")?.to_owned(),
        location: required("location")?.to_owned(),
        bedrooms: parse_count("bedrooms", required("bedrooms")?)?,
        bathrooms: parse_count("bathrooms", required("bathrooms")?)?,
        kitchen: flag("kitchen")?,
        ac: flag("ac")?,
        wifi: flag("wifi")?,
        parking: flag("parking")?,
        food: flag("food")?,
    })
}
