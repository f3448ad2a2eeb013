//! Data Source Verification Module
//!
//! Checks every registered location against the live Open-Meteo forecast
//! endpoint and reports which hourly variables actually come back with
//! data. Run this after changing the registry or the requested variables.

use chrono::Utc;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::ingest::open_meteo::{self, FetchError};
use crate::locations::{LOCATION_REGISTRY, Location};
use crate::logging::{self, Source};
use crate::model::{TimeSeriesBundle, Variable};

/// Days requested per location; enough to see every variable populated.
const VERIFICATION_FORECAST_DAYS: u32 = 1;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<LocationVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationVerification {
    pub location_id: String,
    pub name: String,
    pub status: VerificationStatus,
    pub api_responsive: bool,
    pub sample_count: usize,
    pub variables_available: Vec<Variable>,
    pub variables_missing: Vec<Variable>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Location Verification
// ============================================================================

/// Grades one fetch outcome. Split out from the HTTP call so it can be
/// tested offline.
pub fn assess_location(
    location: &Location,
    outcome: Result<TimeSeriesBundle, FetchError>,
) -> LocationVerification {
    let mut result = LocationVerification {
        location_id: location.id.to_string(),
        name: location.name.to_string(),
        status: VerificationStatus::Failed,
        api_responsive: false,
        sample_count: 0,
        variables_available: Vec::new(),
        variables_missing: Vec::new(),
        error_message: None,
    };

    match outcome {
        Ok(bundle) => {
            result.api_responsive = true;
            result.sample_count = bundle.len();

            for variable in Variable::ALL {
                if bundle.valid_values(variable).is_empty() {
                    result.variables_missing.push(variable);
                } else {
                    result.variables_available.push(variable);
                }
            }

            if result.sample_count > 0 {
                result.status = if result.variables_missing.is_empty() {
                    VerificationStatus::Success
                } else {
                    VerificationStatus::PartialSuccess
                };
            } else {
                result.error_message = Some("API returned no hourly samples".to_string());
            }
        }
        Err(e) => {
            logging::log_fetch_failure(location.id, "verification fetch", &e);
            result.error_message = Some(format!("API request failed: {}", e));
        }
    }

    result
}

pub fn verify_location(
    client: &reqwest::blocking::Client,
    api: &ApiConfig,
    location: &Location,
) -> LocationVerification {
    let url = open_meteo::build_forecast_url(
        &api.forecast_url,
        location.latitude,
        location.longitude,
        VERIFICATION_FORECAST_DAYS,
    );
    assess_location(location, open_meteo::fetch_bundle(client, &url))
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn summarize(results: &[LocationVerification]) -> VerificationSummary {
    let working = results
        .iter()
        .filter(|r| r.status != VerificationStatus::Failed)
        .count();
    VerificationSummary {
        total: results.len(),
        working,
        failed: results.len() - working,
    }
}

pub fn run_full_verification(api: &ApiConfig) -> Result<VerificationReport, FetchError> {
    let client = open_meteo::build_client(api)?;

    let mut results = Vec::with_capacity(LOCATION_REGISTRY.len());
    for location in LOCATION_REGISTRY {
        logging::info(
            Source::OpenMeteo,
            Some(location.id),
            &format!("verifying {}", location.name),
        );
        results.push(verify_location(&client, api, location));
    }

    let summary = summarize(&results);
    logging::log_run_summary(Source::OpenMeteo, summary.total, summary.working, summary.failed);

    Ok(VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        results,
        summary,
    })
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    for result in &report.results {
        match result.status {
            VerificationStatus::Success => {
                println!("  ✓ {} {} ({} samples)", result.location_id, result.name, result.sample_count)
            }
            VerificationStatus::PartialSuccess => println!(
                "  ⚠ {} {} (missing: {:?})",
                result.location_id, result.name, result.variables_missing
            ),
            VerificationStatus::Failed => println!(
                "  ✗ {} {}: {}",
                result.location_id,
                result.name,
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
    }
    println!();

    let success_rate = if report.summary.total > 0 {
        (report.summary.working as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Overall Success Rate: {:.1}% ({}/{})",
        success_rate, report.summary.working, report.summary.total
    );
    println!("═══════════════════════════════════════════════════════════");
}
