use axum::{
    Extension,
    extract::{
        Json, Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::PathRejection,
    },
    http::{HeaderMap, header},
};

use crate::{
    AppState,
    config::Config,
    database::{Property, PropertyQuery},
    error::AppError,
    utils::Claims,
};

use super::form::PropertyForm;
use super::model::{ListPropertiesParams, MessageResponse};

#[axum::debug_handler]
pub async fn add_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let form = PropertyForm::from_multipart(multipart?).await?;
    let image = store_image(&state, &form).await?;

    let created = state
        .properties
        .create(claims.dealer_id, &form.fields, image.as_deref())
        .await;

    match created {
        Ok(id) => {
            tracing::info!("Dealer {} added property {}", claims.dealer_id, id);
            Ok(Json(MessageResponse::new("Property added successfully.")))
        }
        Err(e) => {
            discard_image(&state, image.as_deref()).await;
            Err(e.into())
        }
    }
}

#[axum::debug_handler]
pub async fn list_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListPropertiesParams>,
) -> Result<Json<Vec<Property>>, AppError> {
    let query = PropertyQuery::try_from(params)?;
    let base_url = public_base_url(&headers, &state.config);

    let properties = state
        .properties
        .search(&query)
        .await?
        .into_iter()
        .map(|p| p.with_image_url(&base_url))
        .collect();

    Ok(Json(properties))
}

#[axum::debug_handler]
pub async fn dealer_properties(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Property>>, AppError> {
    let properties = state.properties.list_by_dealer(claims.dealer_id).await?;
    Ok(Json(properties))
}

#[axum::debug_handler]
pub async fn update_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(property_id) = path?;
    let form = PropertyForm::from_multipart(multipart?).await?;
    let image = store_image(&state, &form).await?;

    let updated = state
        .properties
        .update(property_id, claims.dealer_id, &form.fields, image.as_deref())
        .await;

    if let Err(e) = updated {
        discard_image(&state, image.as_deref()).await;
        return Err(e.into());
    }

    // TODO: remove the replaced image file once nothing else can reference it
    tracing::info!("Dealer {} updated property {}", claims.dealer_id, property_id);
    Ok(Json(MessageResponse::new("Property updated successfully.")))
}

#[axum::debug_handler]
pub async fn delete_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(property_id) = path?;
    state
        .properties
        .delete(property_id, claims.dealer_id)
        .await?;

    tracing::info!("Dealer {} deleted property {}", claims.dealer_id, property_id);
    Ok(Json(MessageResponse::new("Property deleted successfully.")))
}

async fn store_image(state: &AppState, form: &PropertyForm) -> Result<Option<String>, AppError> {
    match &form.image {
        Some(upload) => Ok(Some(
            state.uploads.save(&upload.file_name, &upload.bytes[..]).await?,
        )),
        None => Ok(None),
    }
}

/// Compensates an upload whose database write failed.
async fn discard_image(state: &AppState, image: Option<&str>) {
    if let Some(path) = image {
        state.uploads.discard(path).await;
    }
}

/// `scheme://host` as seen by the client, for absolute image URLs.
fn public_base_url(headers: &HeaderMap, config: &Config) -> String {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim())
            .filter(|v| !v.is_empty())
    };

    let scheme = header_value(header::HeaderName::from_static("x-forwarded-proto"))
        .unwrap_or("http");
    let host = header_value(header::HOST).unwrap_or(config.public_host.as_str());
    format!("{scheme}://{host}")
}
