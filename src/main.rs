use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use flatcast::api::{self, AppState};
use flatcast::config::AppConfig;
use flatcast::extract::session::SessionFactory;
use flatcast::extract::ExtractionPipeline;
use flatcast::model::adapter::InferenceAdapter;
use flatcast::model::{ModelArtifacts, SerializedModel};
use flatcast::security::UrlValidator;

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 0.0.0.0:8000
    #[arg(short, long)]
    bind: Option<String>,

    /// Predict for a single listing URL and exit instead of serving
    #[arg(long)]
    url: Option<String>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path).await?,
        None => AppConfig::load().await?,
    };

    flatcast::logging::init_logging(&config.logging)?;
    info!("Starting flatcast v{}", env!("CARGO_PKG_VERSION"));

    let state = build_state(config)?;

    if let Some(url) = args.url {
        return predict_once(&state, &url).await;
    }

    let bind_address = args
        .bind
        .unwrap_or_else(|| format!("{}:{}", state.config.server.host, state.config.server.port));
    info!("Listening on {}", bind_address);

    let enable_cors = state.config.server.enable_cors;
    let data = web::Data::new(state);

    HttpServer::new(move || {
        let cors = if enable_cors {
            Cors::permissive()
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(data.clone())
            .configure(api::configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await?;

    info!("flatcast shutting down");
    Ok(())
}

/// Load the model artifacts once and assemble the shared state
fn build_state(config: AppConfig) -> Result<AppState> {
    let artifacts = Arc::new(ModelArtifacts::load(
        &config.model.features_path,
        &config.model.categorical_path,
    )?);
    let model = Arc::new(SerializedModel::load(&config.model.model_path, artifacts.clone())?);
    let adapter = InferenceAdapter::new(artifacts, model);

    let pipeline =
        ExtractionPipeline::new(Duration::from_secs(config.browser.navigation_timeout_seconds));
    let validator = UrlValidator::new(&config.security);
    let sessions = session_factory(&config);

    Ok(AppState { config, validator, sessions, pipeline, adapter })
}

#[cfg(feature = "browser")]
fn session_factory(config: &AppConfig) -> Arc<dyn SessionFactory> {
    Arc::new(flatcast::extract::session::PlaywrightSessionFactory::new(&config.browser))
}

#[cfg(not(feature = "browser"))]
fn session_factory(config: &AppConfig) -> Arc<dyn SessionFactory> {
    Arc::new(flatcast::extract::session::DisabledSessionFactory::new(&config.browser))
}

/// One-shot CLI mode: predict for a single URL and print the response
async fn predict_once(state: &AppState, url: &str) -> Result<()> {
    let (prediction, record) = state.predict_listing(url).await?;

    let output = serde_json::json!({
        "price_per_meter": prediction.price_per_meter,
        "total_price": prediction.total_price,
        "extracted_features": record,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
