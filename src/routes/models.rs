//! Models endpoint
//!
//! Lists the models the gateway forwards to.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::translate::SUPPORTED_MODELS;

/// Creation timestamp reported for every listed model
const MODEL_CREATED: i64 = 1692901427;

/// Model information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
}

/// Models list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<Model>,
}

/// List available models
pub async fn list_models() -> (StatusCode, Json<ModelsResponse>) {
    let data = SUPPORTED_MODELS
        .iter()
        .map(|id| Model {
            id: id.to_string(),
            object: "model".to_string(),
            created: MODEL_CREATED,
            owned_by: "system".to_string(),
        })
        .collect();

    let response = ModelsResponse {
        object: "list".to_string(),
        data,
    };

    (StatusCode::OK, Json(response))
}
