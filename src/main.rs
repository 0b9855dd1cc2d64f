use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use payconfirm::app::{self, AppState};
use payconfirm::config::{Config, DatabaseConfig, LedgerBackend};
use payconfirm::logging;
use payconfirm::middleware::RequestId;
use payconfirm::modules::gateways::{PaymentGateway, PesapalClient};
use payconfirm::modules::payments::repositories::{MemoryLedger, MySqlLedger, PaymentLedger};
use payconfirm::modules::payments::services::{GenerateReference, ReferenceGenerator};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    logging::init_tracing(&config.app);
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.app.env,
        bind_address = %config.server.bind_address(),
        gateway = %config.gateway.environment(),
        payments_enabled = config.payments.enabled,
        currency = %config.payments.currency,
        "Starting payment confirmation service"
    );

    let ledger: Arc<dyn PaymentLedger> = match config.database.backend {
        LedgerBackend::MySql => {
            let pool = config
                .database
                .create_pool()
                .await
                .context("Failed to create database pool")?;
            DatabaseConfig::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!(
                max_connections = config.database.max_connections,
                "MySQL ledger ready"
            );
            Arc::new(MySqlLedger::new(pool))
        }
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory ledger; transactions are lost on restart");
            Arc::new(MemoryLedger::new())
        }
    };

    let gateway: Arc<dyn PaymentGateway> = Arc::new(
        PesapalClient::new(&config.gateway).context("Failed to build gateway client")?,
    );
    let references: Arc<dyn GenerateReference> =
        Arc::new(ReferenceGenerator::new(config.payments.reference_prefix.clone()));

    let state = AppState::new(
        ledger,
        gateway,
        references,
        config.payments.clone(),
        config.webhook.clone(),
        &config.security.session_token_secret,
    );

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(move |cfg| app::configure(cfg, &state))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("HTTP server terminated with an error")
}
