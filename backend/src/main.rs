//! Imaging records entry-point: loads settings, prepares storage and webhooks,
//! then serves the REST API.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use imaging_records::inbound::http::health::HealthState;
use imaging_records::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use imaging_records::outbound::webhooks::{AnalyzerWebhook, CameraWebhook};
use imaging_records::sample_data::{SampleDataSettings, SampleGenerator, seed_samples_on_startup};
use server::{AppSettings, ServerConfig, build_record_store, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load application settings: {err}"))?;
    init_tracing(settings.debug_mode);

    // Command-line flags belong to `AppSettings`; sample settings come from
    // the environment only.
    let sample_settings = SampleDataSettings::load_from_iter([OsString::from("imaging-records")])
        .map_err(|err| eyre!("failed to load sample data settings: {err}"))?
        .with_debug_mode(settings.debug_mode);

    let config = build_server_config(&settings, &sample_settings).await?;
    let store = build_record_store(&config);

    if let Err(error) = seed_samples_on_startup(&sample_settings, &store).await {
        warn!(error = %error, "startup sample seeding failed");
    }

    info!(
        app_name = settings.app_name(),
        bind_addr = %config.bind_addr(),
        "starting server"
    );
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config, store)?.await?;
    Ok(())
}

fn init_tracing(debug_mode: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug_mode { "debug" } else { "info" })
    });
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

async fn build_server_config(
    settings: &AppSettings,
    sample_settings: &SampleDataSettings,
) -> color_eyre::Result<ServerConfig> {
    let samples = SampleGenerator::from_settings(sample_settings)
        .wrap_err("invalid sample data settings")?;
    let mut config = ServerConfig::new(settings.bind_addr()?, samples);

    if let Some(db_uri) = settings.db_uri() {
        let applied = run_pending_migrations(db_uri.to_owned())
            .await
            .wrap_err("failed to migrate database")?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(PoolConfig::new(db_uri))
            .await
            .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let timeout = settings.webhook_timeout();
    if let Some(url) = settings.camera_interface_url()? {
        let camera = CameraWebhook::new(&url, timeout).wrap_err("invalid camera interface")?;
        info!(endpoint = %camera.endpoint(), "camera webhook configured");
        config = config.with_capture_service(Arc::new(camera));
    }
    if let Some(url) = settings.analyzer_url()? {
        let analyzer = AnalyzerWebhook::new(url, timeout).wrap_err("invalid analyzer")?;
        config = config.with_analysis_service(Arc::new(analyzer));
    }

    Ok(config)
}
