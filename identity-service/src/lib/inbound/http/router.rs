use std::sync::Arc;
use std::time::Duration;

use auth::TokenIssuer;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::admin_stats::admin_stats;
use super::handlers::assign_roles::assign_roles;
use super::handlers::create_role::create_role;
use super::handlers::get_current_user::get_current_user;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use super::middleware::require_admin;
use crate::domain::auth::service::AuthOrchestrator;
use crate::domain::role::service::RoleService;
use crate::domain::user::service::IdentityService;
use crate::outbound::events::KafkaEventPublisher;
use crate::outbound::repositories::PostgresRoleRepository;
use crate::outbound::repositories::PostgresUserRepository;

type Identity = IdentityService<PostgresUserRepository, PostgresRoleRepository>;
type Roles = RoleService<PostgresUserRepository, PostgresRoleRepository>;
type Orchestrator =
    AuthOrchestrator<PostgresUserRepository, PostgresRoleRepository, KafkaEventPublisher>;

#[derive(Clone)]
pub struct AppState {
    pub identity_service: Arc<Identity>,
    pub role_service: Arc<Roles>,
    pub orchestrator: Arc<Orchestrator>,
    pub token_issuer: Arc<TokenIssuer>,
}

pub fn create_router(
    identity_service: Arc<Identity>,
    role_service: Arc<Roles>,
    orchestrator: Arc<Orchestrator>,
    token_issuer: Arc<TokenIssuer>,
) -> Router {
    let state = AppState {
        identity_service,
        role_service,
        orchestrator,
        token_issuer,
    };

    let public_routes = Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login));

    let authenticated_routes = Router::new()
        .route("/api/users/me", get(get_current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The admin gate runs after token validation and before dispatch.
    let admin_routes = Router::new()
        .route("/api/roles", post(create_role))
        .route("/api/users/:user_id/roles", post(assign_roles))
        .route("/api/admin/stats", get(admin_stats))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
