/// Open-Meteo API client
///
/// Retrieves hourly weather series for a point from the Open-Meteo forecast
/// and archive endpoints and adapts the JSON `hourly` block into a
/// [`TimeSeriesBundle`]. The analysis engine never sees the wire shape.
///
/// API Documentation: https://open-meteo.com/en/docs
/// Archive:           https://open-meteo.com/en/docs/historical-weather-api

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::logging::{self, Source};
use crate::model::{AnalysisError, TimeSeriesBundle, Variable};

/// Timestamp format of the `hourly.time` array.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Weather data not available: response has no hourly block")]
    MissingHourly,

    #[error(transparent)]
    Invalid(#[from] AnalysisError),
}

// ============================================================================
// Date ranges
// ============================================================================

/// Inclusive calendar-date range covered by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The most recent date the archive serves: `today` minus `lag_days`.
pub fn latest_archive_date(today: NaiveDate, lag_days: i64) -> Result<NaiveDate, AnalysisError> {
    u64::try_from(lag_days)
        .ok()
        .and_then(|days| today.checked_sub_days(Days::new(days)))
        .ok_or_else(|| {
            AnalysisError::InvalidInput(format!(
                "historical lag of {} days is out of range for {}",
                lag_days, today
            ))
        })
}

/// The 48 hours ending at 23:59 on `end`: `end` and the day before.
///
/// `end` must be at least `lag_days` before `today`; the archive does not
/// serve more recent dates.
pub fn historical_date_range(
    end: NaiveDate,
    today: NaiveDate,
    lag_days: i64,
) -> Result<DateRange, AnalysisError> {
    let latest = latest_archive_date(today, lag_days)?;
    if end > latest {
        return Err(AnalysisError::InvalidInput(format!(
            "historical end date {} is after the latest available date {}",
            end, latest
        )));
    }
    let start = end
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| AnalysisError::InvalidInput(format!("end date {} out of range", end)))?;
    Ok(DateRange { start, end })
}

/// `today` through the last forecast day.
pub fn forecast_date_range(today: NaiveDate, forecast_days: u32) -> DateRange {
    let span = u64::from(forecast_days.saturating_sub(1));
    DateRange {
        start: today,
        end: today.checked_add_days(Days::new(span)).unwrap_or(today),
    }
}

// ============================================================================
// URL construction
// ============================================================================

/// Comma-separated `hourly` parameter for every variable, in request order.
pub fn hourly_parameter() -> String {
    Variable::ALL
        .iter()
        .map(|v| v.api_key())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn build_archive_url(base_url: &str, latitude: f64, longitude: f64, range: &DateRange) -> String {
    format!(
        "{}?latitude={}&longitude={}&start_date={}&end_date={}&hourly={}&timezone=auto",
        base_url,
        latitude,
        longitude,
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d"),
        hourly_parameter()
    )
}

pub fn build_forecast_url(base_url: &str, latitude: f64, longitude: f64, forecast_days: u32) -> String {
    format!(
        "{}?latitude={}&longitude={}&hourly={}&timezone=auto&forecast_days={}",
        base_url,
        latitude,
        longitude,
        hourly_parameter(),
        forecast_days
    )
}

// ============================================================================
// Response parsing
// ============================================================================

/// Top-level Open-Meteo response. Only the fields used here are modelled.
#[derive(Debug, Deserialize)]
pub struct OpenMeteoResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    /// `time` plus one array per requested variable.
    pub hourly: Option<BTreeMap<String, serde_json::Value>>,
}

/// Parses a response body into a bundle.
pub fn parse_response(body: &str) -> Result<TimeSeriesBundle, FetchError> {
    let response: OpenMeteoResponse = serde_json::from_str(body)?;
    bundle_from_response(response)
}

/// Adapts the `hourly` block: `time` becomes the index, every other key
/// must name a known variable and match the index length.
pub fn bundle_from_response(response: OpenMeteoResponse) -> Result<TimeSeriesBundle, FetchError> {
    let mut hourly = response.hourly.ok_or(FetchError::MissingHourly)?;
    let times: Vec<String> = match hourly.remove("time") {
        Some(value) => serde_json::from_value(value)?,
        None => return Err(FetchError::MissingHourly),
    };

    let timestamps = times
        .iter()
        .map(|t| {
            NaiveDateTime::parse_from_str(t, TIME_FORMAT)
                .map_err(|e| AnalysisError::InvalidInput(format!("bad timestamp '{}': {}", t, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut entries = Vec::with_capacity(hourly.len());
    for (key, value) in hourly {
        let values: Vec<Option<f64>> = serde_json::from_value(value)?;
        entries.push((key, values));
    }

    let bundle = TimeSeriesBundle::from_keyed(timestamps, entries)?;
    logging::debug(
        Source::OpenMeteo,
        None,
        &format!(
            "parsed {} hourly samples for {} variables (timezone {})",
            bundle.len(),
            bundle.variables().count(),
            response.timezone.as_deref().unwrap_or("unknown")
        ),
    );
    Ok(bundle)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Builds a blocking client with the configured timeout.
pub fn build_client(api: &ApiConfig) -> Result<reqwest::blocking::Client, FetchError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(api.timeout_secs))
        .build()?)
}

/// GETs `url` and parses the body into a bundle.
pub fn fetch_bundle(client: &reqwest::blocking::Client, url: &str) -> Result<TimeSeriesBundle, FetchError> {
    logging::debug(Source::OpenMeteo, None, &format!("GET {}", url));

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body = response.text()?;
    parse_response(&body)
}

/// Fetches the next `api.forecast_days` days for a point.
pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    api: &ApiConfig,
    latitude: f64,
    longitude: f64,
    today: NaiveDate,
) -> Result<(TimeSeriesBundle, DateRange), FetchError> {
    let url = build_forecast_url(&api.forecast_url, latitude, longitude, api.forecast_days);
    let bundle = fetch_bundle(client, &url)?;
    Ok((bundle, forecast_date_range(today, api.forecast_days)))
}

/// Fetches the 48 hours ending on `end` for a point.
pub fn fetch_historical(
    client: &reqwest::blocking::Client,
    api: &ApiConfig,
    latitude: f64,
    longitude: f64,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(TimeSeriesBundle, DateRange), FetchError> {
    let range = historical_date_range(end, today, api.historical_lag_days)?;
    let url = build_archive_url(&api.archive_url, latitude, longitude, &range);
    let bundle = fetch_bundle(client, &url)?;
    Ok((bundle, range))
}

// ============================================================================
// Tests
// ============================================================================
