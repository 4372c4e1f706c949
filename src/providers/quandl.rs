//! Quandl REST Client
//!
//! Thin client over the two v3 endpoints the pack uses:
//! - GET {base}/datasets/{code}     (time series)
//! - GET {base}/datatables/{code}   (tables, cursor-paginated)
//!
//! Requests retry on 429/5xx and transport failures with exponential
//! backoff and jitter. The API key travels as a query parameter and is
//! never logged.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::PackConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

// ============================================
// RETRY CONSTANTS
// ============================================

/// Base retry delay in milliseconds
pub const BASE_RETRY_MS: u64 = 300;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_MS: u64 = 10_000;

/// Retry attempts on retryable failures
pub const MAX_RETRIES: u32 = 3;

/// Jitter percentage applied to retry delays
pub const RETRY_JITTER_PERCENT: u64 = 20;

// ============================================
// RESPONSE TYPES
// ============================================

/// Time-series payload under the `dataset` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct DatasetResponse {
    dataset: Dataset,
}

/// One page of a datatable
#[derive(Debug, Clone, Deserialize)]
pub struct Datatable {
    #[serde(default)]
    pub columns: Vec<DatatableColumn>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

/// Column descriptor in a datatable page (upstream also sends a type
/// field, unused here)
#[derive(Debug, Clone, Deserialize)]
pub struct DatatableColumn {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct DatatableResponse {
    datatable: Datatable,
    #[serde(default)]
    meta: Option<DatatableMeta>,
}

#[derive(Debug, Deserialize)]
struct DatatableMeta {
    next_cursor_id: Option<String>,
}

/// Error envelope returned by Quandl on failed requests
#[derive(Debug, Deserialize)]
struct QuandlErrorResponse {
    quandl_error: QuandlError,
}

#[derive(Debug, Deserialize)]
struct QuandlError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// A fetched datatable page plus the cursor for the next one
#[derive(Debug, Clone)]
pub struct DatatablePage {
    pub table: Datatable,
    pub next_cursor: Option<String>,
}

// ============================================
// CLIENT
// ============================================

/// Quandl API client with retry and backoff
#[derive(Clone)]
pub struct QuandlClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    page_size: u32,
    max_pages: u32,
}

impl QuandlClient {
    /// Build a client from config; fails without an API key
    pub fn new(config: &PackConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(AppError::missing_api_key)?;
        info!("🔑 Using QUANDL_API_KEY (key hidden)");

        let client = Self::build_client(config.http_timeout)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            page_size: config.table_page_size,
            max_pages: config.table_max_pages,
        })
    }

    /// Cursor follow-ups allowed per table invocation
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::with_source(ErrorCode::Unknown, "Failed to build HTTP client", e))
    }

    /// Fetch a dataset (time series), optionally bounded by a date range
    pub async fn dataset(
        &self,
        code: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> AppResult<Dataset> {
        let url = format!("{}/datasets/{}", self.base_url, code);
        let mut query: Vec<(String, String)> =
            vec![("api_key".to_string(), self.api_key.clone())];
        if let Some(start) = start_date {
            query.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date".to_string(), end.to_string()));
        }

        debug!("📡 GET datasets/{}", code);
        let body = self.get_with_retry(&url, &query).await?;
        let parsed: DatasetResponse = serde_json::from_value(body)?;
        Ok(parsed.dataset)
    }

    /// Fetch one datatable page; `cursor` continues a previous page
    pub async fn datatable_page(
        &self,
        code: &str,
        filters: &[(String, String)],
        cursor: Option<&str>,
    ) -> AppResult<DatatablePage> {
        let url = format!("{}/datatables/{}", self.base_url, code);
        let mut query: Vec<(String, String)> = filters.to_vec();
        query.push(("api_key".to_string(), self.api_key.clone()));
        query.push(("qopts.per_page".to_string(), self.page_size.to_string()));
        if let Some(cursor) = cursor {
            query.push(("qopts.cursor_id".to_string(), cursor.to_string()));
        }

        debug!("📡 GET datatables/{} (cursor: {})", code, cursor.is_some());
        let body = self.get_with_retry(&url, &query).await?;
        let parsed: DatatableResponse = serde_json::from_value(body)?;
        let next_cursor = parsed
            .meta
            .and_then(|m| m.next_cursor_id)
            .filter(|c| !c.is_empty());

        Ok(DatatablePage {
            table: parsed.datatable,
            next_cursor,
        })
    }

    /// GET with exponential backoff on retryable failures
    async fn get_with_retry(&self, url: &str, query: &[(String, String)]) -> AppResult<Value> {
        let mut last_error: Option<AppError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay_ms(attempt);
                debug!("⏳ Retry {}/{} after {}ms", attempt, MAX_RETRIES, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.execute_get(url, query).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if e.code == ErrorCode::UpstreamRateLimited {
                        warn!(
                            "⏳ Rate limited by upstream (attempt {}/{})",
                            attempt + 1,
                            MAX_RETRIES + 1
                        );
                    }
                    if !e.code.is_retryable() {
                        return Err(e);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::upstream_error("request failed with no recorded error")))
    }

    /// Execute a single GET and map failures to coded errors
    async fn execute_get(&self, url: &str, query: &[(String, String)]) -> AppResult<Value> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rate_limited_upstream());
        }
        if status.is_server_error() {
            return Err(AppError::upstream_unavailable(format!(
                "HTTP {} from upstream",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(envelope) = serde_json::from_str::<QuandlErrorResponse>(&body) {
                return Err(map_quandl_error(status.as_u16(), envelope.quandl_error));
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(AppError::upstream_not_found("HTTP 404 from upstream"));
            }
            return Err(AppError::upstream_error(format!(
                "HTTP {} from upstream",
                status.as_u16()
            )));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Map a Quandl error envelope to a coded error.
/// QECx02 is the "code does not exist" family; QEAx01 is a rejected key.
fn map_quandl_error(status: u16, err: QuandlError) -> AppError {
    let detail = format!("{} ({})", err.message, err.code);
    if status == 404 || err.code.eq_ignore_ascii_case("QECx02") {
        AppError::upstream_not_found(detail)
    } else if status == 403 || err.code.eq_ignore_ascii_case("QEAx01") {
        AppError::upstream_unauthorized(detail)
    } else {
        AppError::upstream_error(detail)
    }
}

/// Exponential backoff with ±20% jitter, floored at 50ms
fn retry_delay_ms(attempt: u32) -> u64 {
    let base = BASE_RETRY_MS * 2_u64.pow(attempt - 1);
    let capped = base.min(MAX_RETRY_MS);
    let jitter_range = (capped * RETRY_JITTER_PERCENT) / 100;
    if jitter_range == 0 {
        return capped;
    }
    let jitter: i64 = rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
    (capped as i64 + jitter).max(50) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackConfig;
    use serde_json::json;

    #[test]
    fn test_client_requires_api_key() {
        let config = PackConfig {
            api_key: None,
            ..PackConfig::default()
        };
        let err = QuandlClient::new(&config)
            .err()
            .expect("client must require a key");
        assert_eq!(err.code, ErrorCode::ConfigMissingApiKey);
    }

    #[test]
    fn test_dataset_response_shape() {
        let body = json!({
            "dataset": {
                "id": 49_333_506,
                "dataset_code": "XNDXT25",
                "column_names": ["Trade Date", "Index Value", "High", "Low"],
                "data": [
                    ["2019-09-03", 7_573.26, 7_601.74, 7_517.37],
                    ["2019-09-04", 7_672.58, 7_683.96, 7_622.15]
                ]
            }
        });
        let parsed: DatasetResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.dataset.column_names.len(), 4);
        assert_eq!(parsed.dataset.data.len(), 2);
    }

    #[test]
    fn test_datatable_response_cursor() {
        let body = json!({
            "datatable": {
                "columns": [{"name": "ticker", "type": "String"}],
                "data": [["AAPL"]]
            },
            "meta": {"next_cursor_id": "djE6MTI"}
        });
        let parsed: DatatableResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            parsed.meta.and_then(|m| m.next_cursor_id).as_deref(),
            Some("djE6MTI")
        );

        let body = json!({
            "datatable": {"columns": [], "data": []},
            "meta": {"next_cursor_id": null}
        });
        let parsed: DatatableResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.meta.and_then(|m| m.next_cursor_id).is_none());
    }

    #[test]
    fn test_map_quandl_error_codes() {
        let not_found = map_quandl_error(
            404,
            QuandlError {
                code: "QECx02".to_string(),
                message: "You have submitted an incorrect Quandl code".to_string(),
            },
        );
        assert_eq!(not_found.code, ErrorCode::UpstreamNotFound);

        let unauthorized = map_quandl_error(
            400,
            QuandlError {
                code: "QEAx01".to_string(),
                message: "We could not recognize your API key".to_string(),
            },
        );
        assert_eq!(unauthorized.code, ErrorCode::UpstreamUnauthorized);

        let generic = map_quandl_error(
            422,
            QuandlError {
                code: "QELx04".to_string(),
                message: "Unprocessable filter".to_string(),
            },
        );
        assert_eq!(generic.code, ErrorCode::UpstreamError);
    }

    #[test]
    fn test_retry_delay_bounds() {
        for attempt in 1..=MAX_RETRIES {
            let base = BASE_RETRY_MS * 2_u64.pow(attempt - 1);
            let capped = base.min(MAX_RETRY_MS);
            let slack = (capped * RETRY_JITTER_PERCENT) / 100;
            for _ in 0..50 {
                let delay = retry_delay_ms(attempt);
                assert!(delay >= capped.saturating_sub(slack).max(50));
                assert!(delay <= capped + slack);
            }
        }
    }
}
