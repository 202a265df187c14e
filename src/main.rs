use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod utils;
mod vision;

use config::Config;
use db::init_db;

use crate::vision::recognizer::{FaceRecognizer, PlaceholderRecognizer};
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa_swagger_ui::SwaggerUi;

const INDEX_HTML: &str = include_str!("../static/index.html");

fn render_index(api_prefix: &str) -> String {
    INDEX_HTML.replace("{{API_PREFIX}}", api_prefix)
}

#[get("/")]
async fn index(config: Data<Config>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_index(&config.api_prefix))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    let log = init_db(&config.attendance_csv)?;

    info!(
        addr = %config.server_addr,
        csv = %log.path().display(),
        "Server starting..."
    );

    let recognizer: Arc<dyn FaceRecognizer> =
        Arc::new(PlaceholderRecognizer::new(config.recognized_name.clone()));
    let recognizer = Data::from(recognizer);

    let api_doc = docs::openapi(&config.api_prefix);
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", api_doc.clone()),
            )
            .app_data(Data::new(log.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(recognizer.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
