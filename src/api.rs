use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{FlatcastError, FlatcastResult};
use crate::extract::{ExtractionPipeline, MergedFieldMap};
use crate::model::adapter::{InferenceAdapter, PredictionResult};
use crate::normalize::{self, FeatureRecord};
use crate::security::UrlValidator;
use crate::extract::session::SessionFactory;

/// Shared per-process application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub validator: UrlValidator,
    pub sessions: Arc<dyn SessionFactory>,
    pub pipeline: ExtractionPipeline,
    pub adapter: InferenceAdapter,
}

impl AppState {
    /// Full pipeline for one listing URL: validate, render, extract,
    /// normalize, predict. The rendering session is closed on every exit
    /// path, including extraction failure.
    pub async fn predict_listing(
        &self,
        raw_url: &str,
    ) -> FlatcastResult<(PredictionResult, FeatureRecord)> {
        let url = self.validator.validate(raw_url)?;

        let session = self
            .sessions
            .open()
            .await
            .map_err(|e| FlatcastError::Session { message: e.to_string() })?;

        let extracted = self.pipeline.extract_listing(session.as_ref(), &url).await;
        session.close().await;
        let merged = extracted?;

        self.predict_from_raw(&merged)
    }

    /// Prediction for a pre-extracted feature map, skipping extraction
    pub fn predict_features(
        &self,
        features: &HashMap<String, serde_json::Value>,
    ) -> FlatcastResult<(PredictionResult, FeatureRecord)> {
        let mut raw = MergedFieldMap::new();

        for (key, value) in features {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            if !text.trim().is_empty() {
                raw.insert(key.clone(), text);
            }
        }

        self.predict_from_raw(&raw)
    }

    fn predict_from_raw(
        &self,
        raw: &MergedFieldMap,
    ) -> FlatcastResult<(PredictionResult, FeatureRecord)> {
        // A record with zero extracted fields still proceeds to inference
        // with all-default features.
        let record = normalize::normalize(raw);
        let prediction = self.adapter.predict(&record)?;
        Ok((prediction, record))
    }
}

/// Request for URL-based prediction
#[derive(Debug, Deserialize)]
pub struct PredictUrlRequest {
    pub url: String,
}

/// Request for direct feature-map prediction
#[derive(Debug, Deserialize)]
pub struct PredictFeaturesRequest {
    pub features: HashMap<String, serde_json::Value>,
}

/// Prediction response shared by both endpoints
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub price_per_meter: f64,
    pub total_price: f64,
    pub extracted_features: FeatureRecord,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
}

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/predict-url", web::post().to(predict_url))
            .route("/predict", web::post().to(predict_features))
            .route("/health", web::get().to(health_check)),
    );
}

/// Predict from a listing URL
async fn predict_url(
    state: web::Data<AppState>,
    req: web::Json<PredictUrlRequest>,
) -> ActixResult<HttpResponse> {
    let request_id = Uuid::new_v4();
    info!("API[{}]: predicting from URL {}", request_id, req.url);

    match state.predict_listing(&req.url).await {
        Ok((prediction, record)) => Ok(HttpResponse::Ok().json(PredictResponse {
            price_per_meter: prediction.price_per_meter,
            total_price: prediction.total_price,
            extracted_features: record,
        })),
        Err(e) => {
            error!("API[{}]: prediction failed ({}): {}", request_id, e.category(), e);
            Ok(error_response(&e))
        }
    }
}

/// Predict from a pre-extracted feature map
async fn predict_features(
    state: web::Data<AppState>,
    req: web::Json<PredictFeaturesRequest>,
) -> ActixResult<HttpResponse> {
    let request_id = Uuid::new_v4();
    info!("API[{}]: predicting from {} features", request_id, req.features.len());

    match state.predict_features(&req.features) {
        Ok((prediction, record)) => Ok(HttpResponse::Ok().json(PredictResponse {
            price_per_meter: prediction.price_per_meter,
            total_price: prediction.total_price,
            extracted_features: record,
        })),
        Err(e) => {
            error!("API[{}]: prediction failed ({}): {}", request_id, e.category(), e);
            Ok(error_response(&e))
        }
    }
}

/// Health check endpoint
async fn health_check() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

fn error_response(error: &FlatcastError) -> HttpResponse {
    let body = ErrorResponse { success: false, message: error.to_string() };

    if error.is_client_error() {
        HttpResponse::BadRequest().json(body)
    } else {
        HttpResponse::InternalServerError().json(body)
    }
}
