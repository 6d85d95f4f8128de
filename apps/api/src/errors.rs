use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Pipeline stage a generation call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Analyze,
    Optimize,
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStage::Analyze => f.write_str("analyze"),
            GenerationStage::Optimize => f.write_str("optimize"),
        }
    }
}

/// The text-generation call failed, timed out, or returned unusable output.
#[derive(Debug, Error)]
#[error("{stage} generation failed: {source}")]
pub struct GenerationFailure {
    pub stage: GenerationStage,
    #[source]
    pub source: LlmError,
}

impl GenerationFailure {
    pub fn new(stage: GenerationStage, source: LlmError) -> Self {
        Self { stage, source }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.source, LlmError::Timeout)
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation failure: {0}")]
    Generation(#[from] GenerationFailure),

    /// A generation failure raised while rewriting content inside a full run.
    #[error("Optimization failure: {0}")]
    Optimization(#[source] GenerationFailure),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(failure) => {
                tracing::error!("Generation failure: {failure}");
                if failure.is_timeout() {
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "GENERATION_TIMEOUT",
                        "The AI analysis took too long. Please try again.".to_string(),
                    )
                } else {
                    (
                        StatusCode::BAD_GATEWAY,
                        "GENERATION_FAILED",
                        "The AI analysis could not be completed. Please try again.".to_string(),
                    )
                }
            }
            AppError::Optimization(failure) => {
                tracing::error!("Optimization failure: {failure}");
                let status = if failure.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (
                    status,
                    "OPTIMIZATION_FAILED",
                    "Your resume could not be optimized. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("too many sections".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_generation_timeout_maps_to_gateway_timeout() {
        let failure = GenerationFailure::new(GenerationStage::Analyze, LlmError::Timeout);
        let response = AppError::Generation(failure).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_optimization_failure_maps_to_bad_gateway() {
        let failure = GenerationFailure::new(GenerationStage::Optimize, LlmError::EmptyContent);
        let response = AppError::Optimization(failure).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_optimization_timeout_maps_to_gateway_timeout() {
        let failure = GenerationFailure::new(GenerationStage::Optimize, LlmError::Timeout);
        let response = AppError::Optimization(failure).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "OPTIMIZATION_FAILED");
    }

    #[test]
    fn test_generation_failure_display_names_stage() {
        let failure = GenerationFailure::new(GenerationStage::Optimize, LlmError::EmptyContent);
        assert_eq!(
            failure.to_string(),
            "optimize generation failed: LLM returned empty content"
        );
    }
}
