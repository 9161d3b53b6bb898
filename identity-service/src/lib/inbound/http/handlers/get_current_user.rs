use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::projection::UserView;
use crate::inbound::http::middleware::Principal;
use crate::inbound::http::router::AppState;

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ApiSuccess<UserView>, ApiError> {
    let user = state
        .identity_service
        .get_by_id(&principal.user_id)
        .await
        .map_err(ApiError::from)?;

    let view = state.identity_service.to_projection(&user);

    Ok(ApiSuccess::new(StatusCode::OK, view))
}
