//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use auth::domain::repository::MailSender;
use auth::{AuthConfig, LogMailSender, PgUserRepository, SmtpMailSender, SmtpSettings, auth_router};
use axum::{
    Router, http,
    http::{HeaderName, Method, header},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const API_PREFIX: &str = "/api/v1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Fail fast on bad settings, before touching the database
    let auth_config = AuthConfig::from_env().context("invalid auth configuration")?;

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let cors = cors_layer(&auth_config)?;
    let repo = PgUserRepository::new(pool);

    let app = match smtp_settings()? {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "Using SMTP mail sender");
            let mailer = SmtpMailSender::new(&settings)?;
            build_app(repo, mailer, auth_config, cors)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing mail will only be logged");
            build_app(repo, LogMailSender, auth_config, cors)
        }
    };

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn build_app<M>(repo: PgUserRepository, mailer: M, config: AuthConfig, cors: CorsLayer) -> Router
where
    M: MailSender + Send + Sync + 'static,
{
    Router::new()
        .nest(API_PREFIX, auth_router(repo, mailer, config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// `None` when `SMTP_HOST` is unset
fn smtp_settings() -> anyhow::Result<Option<SmtpSettings>> {
    let Ok(host) = env::var("SMTP_HOST") else {
        return Ok(None);
    };

    let port = match env::var("SMTP_PORT") {
        Ok(port) => port.parse().context("SMTP_PORT must be a port number")?,
        Err(_) => 465,
    };
    let username = env::var("SMTP_USERNAME").unwrap_or_default();

    Ok(Some(SmtpSettings {
        port,
        password: env::var("SMTP_PASSWORD").unwrap_or_default(),
        from: env::var("SMTP_FROM").unwrap_or_else(|_| username.clone()),
        username,
        host,
    }))
}

fn cors_layer(config: &AuthConfig) -> anyhow::Result<CorsLayer> {
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let csrf_header = HeaderName::from_bytes(config.csrf.header_name.as_bytes())
        .context("CSRF_HEADER_NAME is not a valid header name")?;

    Ok(CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            csrf_header,
        ]))
        .allow_credentials(true))
}
