use std::sync::Arc;

use auth::TokenIssuer;
use identity_service::config::Config;
use identity_service::domain::auth::service::AuthOrchestrator;
use identity_service::domain::role::service::RoleService;
use identity_service::domain::user::projection::ProjectionCache;
use identity_service::domain::user::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::events::KafkaEventPublisher;
use identity_service::outbound::repositories::PostgresRoleRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        kafka_brokers = %config.kafka.brokers,
        registration_topic = %config.kafka.registration_topic,
        login_topic = %config.kafka.login_topic,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pg_pool));
    let event_publisher = Arc::new(KafkaEventPublisher::new(&config)?);
    let projection_cache = Arc::new(ProjectionCache::new());

    // The signing key is read once here and immutable for the process
    // lifetime.
    let token_issuer = Arc::new(TokenIssuer::new(
        config.jwt.secret.as_bytes(),
        config.jwt.expiration_hours,
    ));

    let identity_service = Arc::new(IdentityService::new(
        Arc::clone(&user_repository),
        Arc::clone(&role_repository),
        Arc::clone(&projection_cache),
    ));
    let role_service = Arc::new(RoleService::new(
        user_repository,
        role_repository,
        projection_cache,
    ));
    let orchestrator = Arc::new(AuthOrchestrator::new(
        Arc::clone(&identity_service),
        Arc::clone(&token_issuer),
        event_publisher,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        identity_service,
        role_service,
        orchestrator,
        token_issuer,
    );
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
