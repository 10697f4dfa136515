use std::sync::Arc;

use frontdesk_agent::{AssistantRuntime, Repositories};
use frontdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use frontdesk_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

use crate::export::ReportRenderError;
use crate::pdf::PdfGenerator;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AssistantRuntime>,
    pub pdf_generator: Arc<PdfGenerator>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("report templates could not be loaded: {0}")]
    Templates(#[source] ReportRenderError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let pdf_generator =
        PdfGenerator::new(&config.reports.template_dir).map_err(BootstrapError::Templates)?;
    let runtime = AssistantRuntime::new(Repositories::sql(db_pool.clone()))
        .with_history_limit(config.chat.history_limit);

    Ok(Application {
        config,
        db_pool,
        runtime: Arc::new(runtime),
        pdf_generator: Arc::new(pdf_generator),
    })
}
