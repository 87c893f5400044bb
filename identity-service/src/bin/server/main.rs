use std::sync::Arc;

use anyhow::Context;
use auth::PasswordHasher;
use auth::TokenIssuer;
use identity_service::config::Config;
use identity_service::inbound::http::router::create_router;
use identity_service::principal::ports::PrincipalRepository;
use identity_service::principal::service::IdentityService;
use identity_service::repositories::InMemoryPrincipalRepository;
use identity_service::repositories::PostgresPrincipalRepository;
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

    if let Err(e) = run().await {
        tracing::error!(error = ?e, "Startup failure");
        return Err(e);
    }

    Ok(())
}

async fn run() -> Result<(), anyhow::Error> {
    let config = Config::load().context("Failed to load configuration")?;

    tracing::info!(
        http_port = config.server.http_port,
        in_memory_store = config.database.is_in_memory(),
        precheck = ?config.registration.precheck,
        "Configuration loaded"
    );

    if config.database.is_in_memory() {
        tracing::warn!("Using in-memory identity store; data is lost on exit");
        let repository = Arc::new(InMemoryPrincipalRepository::new());
        return serve(&config, repository).await;
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    let repository = Arc::new(PostgresPrincipalRepository::new(pg_pool));
    serve(&config, repository).await
}

async fn serve<R: PrincipalRepository>(
    config: &Config,
    repository: Arc<R>,
) -> Result<(), anyhow::Error> {
    let token_issuer = Arc::new(
        TokenIssuer::new(config.jwt.secret.as_bytes()).context("Invalid JWT configuration")?,
    );

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_cost_kib,
        config.password.iterations,
        config.password.parallelism,
    )
    .context("Invalid password hashing configuration")?;

    let identity_service = Arc::new(
        IdentityService::new(repository, password_hasher, Arc::clone(&token_issuer))
            .with_precheck(config.registration.precheck),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address)
        .await
        .with_context(|| format!("Failed to bind {}", http_address))?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(identity_service, token_issuer);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
