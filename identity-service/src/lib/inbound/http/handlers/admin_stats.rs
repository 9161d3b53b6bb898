use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::service::AdminStats;
use crate::inbound::http::router::AppState;

pub async fn admin_stats(
    State(state): State<AppState>,
) -> Result<ApiSuccess<AdminStatsResponseData>, ApiError> {
    state
        .identity_service
        .admin_stats()
        .await
        .map_err(ApiError::from)
        .map(|stats| ApiSuccess::new(StatusCode::OK, stats.into()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponseData {
    pub total_users: u64,
    /// Last login per user email; null for users that never logged in.
    pub last_logins: HashMap<String, Option<DateTime<Utc>>>,
}

impl From<AdminStats> for AdminStatsResponseData {
    fn from(stats: AdminStats) -> Self {
        Self {
            total_users: stats.total_users,
            last_logins: stats.last_logins,
        }
    }
}
