//! Centralized Error Handling Module
//!
//! Every failure carries a unique code so production logs can be grepped
//! by category.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - UPSTREAM_xxx: Quandl API errors
//! - FN_xxx: function lookup and argument errors
//! - API_xxx: invocation API errors
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Upstream (Quandl) Errors
    // ============================================
    /// Connection to the Quandl API failed
    UpstreamConnectionFailed,
    /// Quandl request timed out
    UpstreamTimeout,
    /// Quandl rate limited the request (HTTP 429)
    UpstreamRateLimited,
    /// Quandl responded 5xx
    UpstreamUnavailable,
    /// Quandl rejected the API key
    UpstreamUnauthorized,
    /// Dataset or table code does not exist
    UpstreamNotFound,
    /// Quandl returned an error response
    UpstreamError,
    /// Response body could not be parsed
    UpstreamInvalidResponse,

    // ============================================
    // Function Errors
    // ============================================
    /// No function with the requested name
    FnUnknownFunction,
    /// Required positional parameter absent
    FnMissingParam,
    /// Parameter value has the wrong shape
    FnInvalidParam,
    /// Date parameter is neither ISO nor a spreadsheet serial
    FnInvalidDate,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Unauthorized (invalid API key)
    ApiUnauthorized,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,
    /// Resource not found
    ApiNotFound,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Missing Quandl API key
    ConfigMissingApiKey,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Upstream Errors
            Self::UpstreamConnectionFailed => "UPSTREAM_CONNECTION_FAILED",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamRateLimited => "UPSTREAM_RATE_LIMITED",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamUnauthorized => "UPSTREAM_UNAUTHORIZED",
            Self::UpstreamNotFound => "UPSTREAM_NOT_FOUND",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::UpstreamInvalidResponse => "UPSTREAM_INVALID_RESPONSE",

            // Function Errors
            Self::FnUnknownFunction => "FN_UNKNOWN_FUNCTION",
            Self::FnMissingParam => "FN_MISSING_PARAM",
            Self::FnInvalidParam => "FN_INVALID_PARAM",
            Self::FnInvalidDate => "FN_INVALID_DATE",

            // API Errors
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",
            Self::ApiNotFound => "API_NOT_FOUND",

            // Configuration Errors
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigMissingApiKey => "CFG_MISSING_API_KEY",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest
            | Self::FnMissingParam
            | Self::FnInvalidParam
            | Self::FnInvalidDate
            | Self::ConfigInvalidValue => 400,
            Self::ApiUnauthorized | Self::UpstreamUnauthorized | Self::ConfigMissingApiKey => 401,
            Self::ApiNotFound | Self::FnUnknownFunction | Self::UpstreamNotFound => 404,
            Self::ApiRateLimited | Self::UpstreamRateLimited => 429,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTimeout
                | Self::UpstreamRateLimited
                | Self::UpstreamConnectionFailed
                | Self::UpstreamUnavailable
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Quandl rate limited the request
    pub fn rate_limited_upstream() -> Self {
        Self::new(ErrorCode::UpstreamRateLimited, "Rate limited (HTTP 429)")
    }

    /// Quandl responded 5xx
    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, msg)
    }

    /// Quandl returned an error response
    pub fn upstream_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamError, msg)
    }

    /// Quandl rejected the API key
    pub fn upstream_unauthorized(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamUnauthorized, msg)
    }

    /// Dataset or table code does not exist
    pub fn upstream_not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamNotFound, msg)
    }

    /// Response body could not be parsed
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamInvalidResponse, msg)
    }

    /// No function with the requested name
    pub fn unknown_function(name: &str) -> Self {
        Self::new(
            ErrorCode::FnUnknownFunction,
            format!("Unknown function: {}", name),
        )
    }

    /// Required positional parameter absent
    pub fn missing_param(function: &str, param: &str) -> Self {
        Self::new(
            ErrorCode::FnMissingParam,
            format!("{}: missing required parameter '{}'", function, param),
        )
    }

    /// Parameter value has the wrong shape
    pub fn invalid_param(param: &str, msg: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::FnInvalidParam,
            format!("{}: {}", param, msg.into()),
        )
    }

    /// Date parameter is neither ISO nor a spreadsheet serial
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::FnInvalidDate, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Missing Quandl API key
    pub fn missing_api_key() -> Self {
        Self::new(ErrorCode::ConfigMissingApiKey, "QUANDL_API_KEY not configured")
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::UpstreamTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamConnectionFailed, "Connection failed")
        } else {
            Self::new(ErrorCode::UpstreamError, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamInvalidResponse, "JSON parse error", err)
    }
}
