//! flatcast - apartment listing scraping and price estimation
//!
//! The crate renders a listing page through a browser session, extracts
//! apartment attributes through a three-tier pipeline (embedded page
//! state, rendered markup, visible text), reconciles them under fixed
//! precedence, normalizes them to the trained model's feature schema and
//! serves price-per-meter / total-price estimates over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod security;

// Re-export main types for convenience
pub use crate::config::AppConfig;
pub use crate::error::{FlatcastError, FlatcastResult};
pub use crate::extract::ExtractionPipeline;
pub use crate::model::adapter::{InferenceAdapter, PredictionResult};
