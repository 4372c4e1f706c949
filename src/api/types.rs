//! API Request/Response Types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::functions::manifest::FunctionSpec;
use crate::models::errors::AppError;
use crate::telemetry::TelemetryStats;
use crate::utils::cache::CacheStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "API_BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            code: "API_UNAUTHORIZED".to_string(),
            message: "Invalid or missing API key".to_string(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "API_INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

// ============================================
// Function Invocation
// ============================================

/// Invocation body: the positional argument array, bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InvokeBody {
    Positional(Vec<Value>),
    Wrapped { params: Vec<Value> },
}

impl InvokeBody {
    pub fn into_params(self) -> Vec<Value> {
        match self {
            Self::Positional(params) => params,
            Self::Wrapped { params } => params,
        }
    }
}

/// Invocation result: the grid plus accounting
#[derive(Debug, Serialize)]
pub struct InvokeData {
    pub function: String,
    /// Header row first, then data rows
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub column_count: usize,
    /// Whether the pagination budget dropped rows
    pub truncated: bool,
    /// Whether the result was served from cache
    pub cached: bool,
}

// ============================================
// Function Manifest
// ============================================

#[derive(Debug, Serialize)]
pub struct FunctionListData {
    pub functions: Vec<&'static FunctionSpec>,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub telemetry: TelemetryStats,
    pub cache: CacheStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
