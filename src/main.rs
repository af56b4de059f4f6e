use actix_web::HttpServer;
use std::env;

use crate::app::config::Config;
use crate::app::factory::{AppState, CreateApp};

mod app;
mod ai_agent;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  if env::var_os("RUST_LOG").is_none() {
    env::set_var("RUST_LOG", "actix_web=info,info");
  }
  env_logger::init();

  let config : Config = Config::load();
  let app_state: AppState = AppState::new(&config)?;

  log::info!("Starting Financial Document Analyzer on {}:{} with {} / {}",
    config.server_host, config.server_port, config.model_provider, config.model_name);

  let server_builder = HttpServer::new(move || {
    let factory: CreateApp = CreateApp::new(app_state.clone());
    factory.build_app().wrap(actix_web::middleware::Logger::default())
  });

  let server = server_builder.bind((config.server_host.as_str(), config.server_port))?;

  server.run().await?;

  Ok(())
}
