use actix_web::{App, HttpServer, middleware::Logger, web};
use std::sync::Arc;

use fundhunt_backend::{
    config::Config,
    external::{SupabaseClient, TableStore},
    handlers, logging,
    middlewares::create_cors,
    services::CaseService,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = Config::from_toml()?;
    config.require_intake()?;

    let store: Arc<dyn TableStore> = Arc::new(SupabaseClient::new(
        &config.supabase.url,
        &config.supabase.anon_key,
    )?);
    let case_service = CaseService::new(store, config.intake.cases_table.clone());
    let allowed_origins = config.intake.allowed_origins.clone();

    log::info!(
        "Starting case intake API at {}:{} (origins: {})",
        config.server.host,
        config.server.port,
        allowed_origins.join(", ")
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&allowed_origins))
            .app_data(web::Data::new(case_service.clone()))
            .configure(swagger_config)
            .configure(handlers::case_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
