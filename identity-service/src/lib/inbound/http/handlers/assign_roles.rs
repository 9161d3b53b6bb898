use std::collections::HashSet;

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::UserId;
use crate::domain::user::projection::UserView;
use crate::inbound::http::router::AppState;
use crate::user::errors::IdentityError;

pub async fn assign_roles(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<AssignRolesRequest>,
) -> Result<ApiSuccess<UserView>, ApiError> {
    let user_id = UserId::from_string(&user_id)
        .map_err(|e| ApiError::from(IdentityError::from(e)))?;

    state
        .role_service
        .assign_roles(&user_id, body.role_names)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, UserView::from(user)))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolesRequest {
    role_names: HashSet<String>,
}
