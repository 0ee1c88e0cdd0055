use axum::extract::{Json, State};

use crate::{AppState, error::AppError};

use super::model::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let dealer_id = state
        .credentials
        .register(&req.name, &req.email, &req.password)
        .await?;
    let token = state.tokens.issue(dealer_id)?;

    Ok(Json(RegisterResponse {
        message: "Dealer registered successfully.",
        token,
    }))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let dealer_id = state.credentials.verify(&req.email, &req.password).await?;
    let token = state.tokens.issue(dealer_id)?;
    tracing::info!("Dealer {} logged in", dealer_id);

    Ok(Json(LoginResponse { token }))
}
