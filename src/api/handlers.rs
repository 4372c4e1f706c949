//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use super::types::*;
use crate::config::PackConfig;
use crate::functions::{self, manifest};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::Grid;
use crate::providers::quandl::QuandlClient;
use crate::telemetry::TelemetryCollector;
use crate::utils::cache::GridCache;

/// Shared application state
pub struct AppState {
    pub config: PackConfig,
    pub client: QuandlClient,
    pub cache: Arc<GridCache>,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: PackConfig, telemetry: Arc<TelemetryCollector>) -> AppResult<Self> {
        let client = QuandlClient::new(&config)?;
        let cache = Arc::new(GridCache::with_ttl(config.cache_ttl_secs));

        // Background task: drop expired cache entries every 60 seconds
        let cache_clone = cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                let removed = cache_clone.cleanup_expired();
                if removed > 0 {
                    tracing::info!("🧹 Cache cleanup: {} expired entries removed", removed);
                }
            }
        });

        Ok(Self {
            config,
            client,
            cache,
            telemetry,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, ms(start)))
}

// ============================================
// Function Manifest
// ============================================

pub async fn list_functions(
    State(_state): State<Arc<AppState>>,
) -> Json<ApiResponse<FunctionListData>> {
    let start = Instant::now();

    let data = FunctionListData {
        functions: manifest::manifest().iter().collect(),
    };

    Json(ApiResponse::success(data, ms(start)))
}

// ============================================
// Function Invocation
// ============================================

pub async fn invoke_function(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(body): Json<InvokeBody>,
) -> Result<Json<ApiResponse<InvokeData>>, (StatusCode, Json<ApiResponse<()>>)> {
    let start = Instant::now();
    let params = body.into_params();

    let cache_key = GridCache::key(&name, &params);
    if let Some(grid) = state.cache.get(&cache_key) {
        state
            .telemetry
            .record_invocation(&name, grid.row_count() as u64, start.elapsed().as_millis() as u64);
        return Ok(Json(ApiResponse::success(
            invoke_data(&name, grid, true),
            ms(start),
        )));
    }

    match functions::invoke(&state.client, &name, &params).await {
        Ok(grid) => {
            state.cache.set(cache_key, grid.clone());
            state
                .telemetry
                .record_invocation(&name, grid.row_count() as u64, start.elapsed().as_millis() as u64);
            Ok(Json(ApiResponse::success(
                invoke_data(&name, grid, false),
                ms(start),
            )))
        }
        Err(e) => {
            state
                .telemetry
                .record_error(&name, e.code_str(), start.elapsed().as_millis() as u64);
            error!("❌ {} failed: {}", name, e);
            Err(error_response(&e, start))
        }
    }
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        telemetry: state.telemetry.get_stats(),
        cache: state.cache.stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, ms(start)))
}

// ============================================
// Helpers
// ============================================

fn invoke_data(name: &str, grid: Grid, cached: bool) -> InvokeData {
    InvokeData {
        function: name.to_string(),
        row_count: grid.row_count(),
        column_count: grid.column_count(),
        truncated: grid.truncated(),
        rows: grid.into_rows(),
        cached,
    }
}

fn error_response(err: &AppError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(ApiError::from(err), ms(start))))
}

fn ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
