use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use jwt_auth_server::{auth, health_check, AppError, AppState, JwtGuard, Settings};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn build_cors(config: &Settings) -> Cors {
    let cors = &config.cors;
    if !cors.enabled {
        // CORS disabled - use most restrictive settings
        return Cors::default();
    }

    let cors_config = if cors.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        cors.allowed_origins
            .iter()
            .fold(Cors::default(), |c, origin| c.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
    };

    cors_config.max_age(cors.max_age as usize)
}

#[actix_web::main]
async fn main() -> jwt_auth_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    init_tracing();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    if config.is_production() && config.auth.jwt_secret == "development_secret" {
        warn!("Running in production with the default JWT secret");
    }

    let guard = Arc::new(JwtGuard::new(&config.auth)?);
    let state = web::Data::new(AppState::with_guard(guard.clone()));

    // Drop revocations for tokens that can no longer be used
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(REVOCATION_PURGE_INTERVAL).await;
            guard.purge_revoked().await;
        }
    });

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let workers = config.server.workers.max(1) as usize;
    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&config))
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .configure(auth::routes)
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
