use actix_web::{App, HttpServer, middleware::Logger, web};
use std::sync::Arc;

use fundhunt_backend::{
    config::Config,
    external::{SupabaseClient, TableStore},
    handlers, logging,
    middlewares::SessionMiddleware,
    services::{AdminService, LoginGuard, PaymentService},
    utils::SessionTokenService,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let config = Config::from_toml()?;
    config.require_checkout()?;

    let store: Arc<dyn TableStore> = Arc::new(SupabaseClient::new(
        &config.supabase.url,
        &config.supabase.service_key,
    )?);

    let checkout = &config.checkout;
    let tokens = SessionTokenService::new(&checkout.session_secret, checkout.session_ttl_secs)
        .with_admin_ttl(config.admin.session_ttl_secs)
        .with_secure_cookie(checkout.secure_cookie);
    let payment_service = PaymentService::new(
        store.clone(),
        checkout.payments_table.clone(),
        checkout.card_policy,
        checkout.persist_raw_card_data,
    );
    let admin_service = AdminService::new(
        store,
        checkout.payments_table.clone(),
        config.admin.download_password.clone(),
        LoginGuard::new(config.admin.max_failed_attempts, config.admin.lockout_secs),
    )
    .with_trusted_proxies(config.admin.trusted_proxies.clone());

    log::info!(
        "Starting checkout UI at {}:{} (card policy: {:?})",
        config.server.host,
        config.server.port,
        checkout.card_policy
    );

    HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(tokens.clone()))
            .wrap(Logger::default())
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .configure(handlers::checkout_config)
            .configure(handlers::admin_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
