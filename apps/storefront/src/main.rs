// apps/storefront/src/main.rs

use actix_cors::Cors;
use actix_web::{web as actix_data, App, HttpServer};
use storefront::{web::configure_app_routes, AppConfig, AppState};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
  std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    startup_error(e)
  })?;
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let cors_origin = app_config.cors_allowed_origin.clone();

  let app_state = AppState::connect(app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise application state.");
    startup_error(e)
  })?;

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    let cors = Cors::default()
      .allowed_origin(&cors_origin)
      .allow_any_method()
      .allow_any_header()
      .max_age(3600);

    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(cors)
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
