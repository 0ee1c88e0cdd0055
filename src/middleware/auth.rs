use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{AppState, error::AppError};

/// Verifies `Authorization: Bearer <token>` and exposes the token's
/// [`Claims`](crate::utils::Claims) to handlers as a request extension.
///
/// A missing or non-Bearer header is reported as a missing token (403);
/// a bad signature or an expired token is rejected with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req.headers().typed_get::<Authorization<Bearer>>();
    let claims = state.tokens.verify(bearer.as_ref().map(|b| b.token()))?;

    tracing::debug!("Authenticated dealer {}", claims.dealer_id);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
