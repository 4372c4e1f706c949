//! Invocation telemetry
//!
//! Counts function invocations, errors, rows returned and latency for
//! the /v1/stats endpoint and the shutdown report. Stats can be exported
//! as JSON next to the process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Total function invocations (including failed ones)
    pub total_invocations: u64,
    /// Invocations that ended in an error
    pub total_errors: u64,
    /// Invocations by function name
    pub invocations_by_function: HashMap<String, u64>,
    /// Errors by error code
    pub errors_by_code: HashMap<String, u64>,
    /// Total data rows returned to callers
    pub total_rows_returned: u64,
    /// Average invocation latency (ms)
    pub avg_latency_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_invocations: AtomicU64,
    total_errors: AtomicU64,
    total_rows: AtomicU64,
    total_latency_ms: AtomicU64,
    /// Invocation counters by function name
    by_function: RwLock<HashMap<String, u64>>,
    /// Error counters by error code
    by_error_code: RwLock<HashMap<String, u64>>,
    /// Session start time
    session_start: u64,
    /// Export directory
    export_dir: PathBuf,
}

impl TelemetryCollector {
    /// Create new collector with default settings
    pub fn new() -> Self {
        Self::with_export_dir(PathBuf::from("./telemetry"))
    }

    /// Create collector with a custom export directory
    pub fn with_export_dir(export_dir: PathBuf) -> Self {
        let _ = fs::create_dir_all(&export_dir);

        Self {
            total_invocations: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_rows: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            by_function: RwLock::new(HashMap::new()),
            by_error_code: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
            export_dir,
        }
    }

    /// Record a successful invocation
    pub fn record_invocation(&self, function: &str, rows: u64, latency_ms: u64) {
        self.total_invocations.fetch_add(1, Ordering::Relaxed);
        self.total_rows.fetch_add(rows, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if let Ok(mut counts) = self.by_function.write() {
            *counts.entry(function.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a failed invocation
    pub fn record_error(&self, function: &str, code: &str, latency_ms: u64) {
        self.total_invocations.fetch_add(1, Ordering::Relaxed);
        self.total_errors.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if let Ok(mut counts) = self.by_function.write() {
            *counts.entry(function.to_string()).or_insert(0) += 1;
        }
        if let Ok(mut counts) = self.by_error_code.write() {
            *counts.entry(code.to_string()).or_insert(0) += 1;
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_invocations = self.total_invocations.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if total_invocations > 0 {
            total_latency as f64 / total_invocations as f64
        } else {
            0.0
        };

        let invocations_by_function = self
            .by_function
            .read()
            .map(|counts| counts.clone())
            .unwrap_or_default();
        let errors_by_code = self
            .by_error_code
            .read()
            .map(|counts| counts.clone())
            .unwrap_or_default();

        TelemetryStats {
            total_invocations,
            total_errors: self.total_errors.load(Ordering::Relaxed),
            invocations_by_function,
            errors_by_code,
            total_rows_returned: self.total_rows.load(Ordering::Relaxed),
            avg_latency_ms: avg_latency,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }

    /// Export current stats to a JSON file
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        let stats = self.get_stats();
        let filename = format!("stats_{}.json", current_timestamp());
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> TelemetryCollector {
        TelemetryCollector::with_export_dir(std::env::temp_dir().join("quandl-fns-telemetry"))
    }

    #[test]
    fn test_record_invocation() {
        let telemetry = collector();
        telemetry.record_invocation("quandl-series", 25, 120);
        telemetry.record_invocation("quandl-series", 10, 80);
        telemetry.record_invocation("quandl-table", 1000, 400);

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_invocations, 3);
        assert_eq!(stats.total_errors, 0);
        assert_eq!(stats.total_rows_returned, 1035);
        assert_eq!(stats.invocations_by_function["quandl-series"], 2);
        assert_eq!(stats.avg_latency_ms, 200.0);
    }

    #[test]
    fn test_record_error() {
        let telemetry = collector();
        telemetry.record_error("quandl-table", "UPSTREAM_NOT_FOUND", 30);

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_invocations, 1);
        assert_eq!(stats.total_errors, 1);
        assert_eq!(stats.errors_by_code["UPSTREAM_NOT_FOUND"], 1);
    }
}
