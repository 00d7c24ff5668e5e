use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth};
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Connect with the configured pool and apply migrations when enabled.
pub async fn prepare_database(cfg: &AppConfig) -> Result<DatabaseConnection, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;
        info!("migrations applied");
    } else {
        warn!("auto_migrate disabled; schema must already be current");
    }
    Ok(db)
}

/// Wire the auth service over `db`. The role catalog is not seeded here.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> auth::ServerState {
    let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
    let auth_cfg = AuthConfig {
        jwt_secret: cfg.auth.jwt_secret.clone(),
        token_ttl: chrono::Duration::minutes(cfg.auth.token_ttl_minutes),
    };
    auth::ServerState {
        db,
        auth: Arc::new(AuthService::with_config(repo, &auth_cfg)),
        cookie: auth::ServerAuthConfig { cookie_secure: cfg.auth.cookie_secure },
    }
}

pub fn build_app(state: auth::ServerState) -> Router {
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: load config, prepare the database, seed roles and serve until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let db = prepare_database(&cfg).await?;
    let state = build_state(db, &cfg);
    state.auth.seed_roles().await?;

    let app = build_app(state);
    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "starting server");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
