use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, http::header};
use anyhow::Context;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod repo;
mod routes;
mod utils;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

use config::Config;
use db::init_db;

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

/// CORS policy for the presentation layer. `*` lets any origin in.
fn cors(config: &Config) -> Cors {
    let cors = if config.allows_any_origin() {
        Cors::default().allow_any_origin()
    } else {
        config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url).await?;

    if config.seed_sample_data {
        let seeded = db::seed_sample_data(&pool).await?;
        info!(seeded, "Sample data check finished");
    }

    if config.allows_any_origin() {
        warn!("CORS allows any origin; set CORS_ORIGINS in production");
    }

    let write_limiter = routes::build_limiter(config.rate_limit_per_min)?;
    let openapi = docs::openapi(&config);
    let server_addr = config.server_addr.clone();
    let pool_for_server = pool.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(cors(&config))
            .wrap(actix_web::middleware::Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(Data::new(pool_for_server.clone()))
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config, write_limiter.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    info!("Server stopped, closing database pool");
    pool.close().await;

    Ok(())
}
