/// End-to-end tests of the analysis pipeline on Open-Meteo shaped payloads
///
/// Tests verify:
/// 1. A raw `hourly` response adapts into an aligned bundle
/// 2. Every analysis output is produced from that bundle
/// 3. Boundary behaviour with missing and malformed data
///
/// These run offline; see open_meteo_integration.rs for live API checks.

use meteo_service::alert::{AlertCategory, AlertSeverity, AlertThresholds, RiskLevel, evaluate_alerts, risk_level};
use meteo_service::analysis::correlation::{
    CORRELATION_VARIABLES, build_correlation_matrix, pearson, rank_significant_correlations,
};
use meteo_service::analysis::patterns::PatternKind;
use meteo_service::analysis::{analyze_patterns, compute_stats};
use meteo_service::ingest::open_meteo::{self, DateRange, FetchError};
use meteo_service::locations::find_location;
use meteo_service::model::{AnalysisError, QueryMode, TimeSeriesBundle, Variable};
use meteo_service::report::{QueryContext, analyze_bundle, render_text};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// 48 hourly samples of a warm day turning into a stormy night.
fn storm_payload() -> serde_json::Value {
    let hours = 48;
    let time: Vec<String> = (0..hours)
        .map(|h| format!("2024-07-{:02}T{:02}:00", 14 + h / 24, h % 24))
        .collect();
    let temperature: Vec<Option<f64>> = (0..hours)
        .map(|h| if h == 5 { None } else { Some(22.0 + (h as f64) * 0.24) })
        .collect();
    let dewpoint: Vec<Option<f64>> = (0..hours).map(|h| Some(12.0 + (h as f64) * 0.2)).collect();
    let humidity: Vec<Option<f64>> = (0..hours).map(|h| Some(80.0 - (h as f64) * 0.5)).collect();
    let rain: Vec<Option<f64>> = (0..hours)
        .map(|h| if h == 40 { Some(14.5) } else if h > 40 { Some(2.0) } else { Some(0.0) })
        .collect();
    let snowfall: Vec<Option<f64>> = vec![Some(0.0); hours];
    let wind: Vec<Option<f64>> = (0..hours).map(|h| Some(5.0 + (h % 12) as f64)).collect();
    let gusts: Vec<Option<f64>> = (0..hours).map(|h| Some(if h == 41 { 62.0 } else { 20.0 })).collect();
    let pressure: Vec<Option<f64>> = (0..hours).map(|h| Some(1016.0 - (h as f64) * 0.3)).collect();

    json!({
        "latitude": 40.42,
        "longitude": -3.7,
        "timezone": "Europe/Madrid",
        "hourly": {
            "time": time,
            "temperature_2m": temperature,
            "rain": rain,
            "snowfall": snowfall,
            "windspeed_10m": wind,
            "windgusts_10m": gusts,
            "relativehumidity_2m": humidity,
            "surface_pressure": pressure,
            "dewpoint_2m": dewpoint
        }
    })
}

fn storm_bundle() -> TimeSeriesBundle {
    open_meteo::parse_response(&storm_payload().to_string()).expect("storm payload parses")
}

fn context(mode: QueryMode) -> QueryContext {
    QueryContext {
        location: find_location("1").expect("registry has location 1").clone(),
        range: DateRange {
            start: chrono::NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        },
        mode,
    }
}

// ---------------------------------------------------------------------------
// 1. Adapter
// ---------------------------------------------------------------------------

#[test]
fn test_payload_adapts_into_aligned_bundle() {
    let bundle = storm_bundle();
    assert_eq!(bundle.len(), 48);
    for variable in Variable::ALL {
        assert_eq!(bundle.values(variable).len(), 48, "{} misaligned", variable);
    }
    // The null at hour 5 keeps its slot.
    assert_eq!(bundle.values(Variable::Temperature)[5], None);
    assert_eq!(bundle.valid_values(Variable::Temperature).len(), 47);
}

#[test]
fn test_payload_without_hourly_time_is_rejected() {
    let body = json!({ "hourly": { "rain": [0.0] } }).to_string();
    assert!(matches!(
        open_meteo::parse_response(&body),
        Err(FetchError::MissingHourly)
    ));
}

// ---------------------------------------------------------------------------
// 2. Analysis outputs
// ---------------------------------------------------------------------------

#[test]
fn test_storm_alerts_in_rule_order() {
    let bundle = storm_bundle();
    let alerts = evaluate_alerts(&bundle, &AlertThresholds::default());
    let categories: Vec<_> = alerts.iter().map(|a| a.category).collect();

    // Max temperature is 22 + 47 * 0.24 = 33.28, pressure falls 14.1 hPa.
    assert_eq!(
        categories,
        vec![
            AlertCategory::Heat,
            AlertCategory::DangerousWind,
            AlertCategory::IntenseRain,
            AlertCategory::PressureChange,
        ]
    );
    assert_eq!(alerts[0].message, "High temperature: 33.3°C");
    assert_eq!(alerts[1].severity, AlertSeverity::High);
    assert_eq!(risk_level(&alerts), RiskLevel::High);
}

#[test]
fn test_storm_correlations() {
    let bundle = storm_bundle();
    let matrix = build_correlation_matrix(&bundle);
    assert_eq!(matrix.len(), CORRELATION_VARIABLES.len() * CORRELATION_VARIABLES.len());

    // Matrix is symmetric.
    for a in &matrix {
        let mirror = matrix
            .iter()
            .find(|b| b.variable_a == a.variable_b && b.variable_b == a.variable_a)
            .expect("mirror cell exists");
        assert_eq!(a.coefficient, mirror.coefficient);
    }

    let ranked = rank_significant_correlations(&matrix);
    assert!(ranked.len() <= 8);
    assert!(ranked.iter().all(|c| c.variable_a != c.variable_b));
    // Temperature, dew point, humidity and pressure are all linear in time.
    assert!((ranked[0].coefficient.abs() - 1.0).abs() < 1e-9);
}

#[test]
fn test_storm_patterns() {
    let bundle = storm_bundle();
    let patterns = analyze_patterns(&bundle, QueryMode::Historical);
    assert_eq!(patterns.len(), 4);
    assert_eq!(patterns[0].kind, PatternKind::TemperatureTrend);
    assert_eq!(patterns[0].value, "Ascending +11.3°C");
    assert_eq!(patterns[1].value, "Rain: 28.5mm | Snow: 0.0cm");
    assert_eq!(patterns[2].value, "Range: 11.0 km/h (5.0 - 16.0)");
    assert_eq!(patterns[3].value, "Moderately variable");
}

#[test]
fn test_full_report_and_rendering() {
    let bundle = storm_bundle();
    let report = analyze_bundle(&bundle, context(QueryMode::Historical), &AlertThresholds::default());

    assert_eq!(report.samples, 48);
    assert_eq!(report.stats.len(), 8);
    assert_eq!(report.summary.max_wind_gust, Some(62.0));
    assert_eq!(report.summary.risk_level, RiskLevel::High);

    let text = render_text(&report);
    assert!(text.contains("Dangerous winds: 62.0 km/h"));
    assert!(text.contains("Atmospheric Stability: Moderately variable"));
}

#[test]
fn test_analysis_is_idempotent() {
    let bundle = storm_bundle();
    let thresholds = AlertThresholds::default();
    let first = analyze_bundle(&bundle, context(QueryMode::Forecast), &thresholds);
    let second = analyze_bundle(&bundle, context(QueryMode::Forecast), &thresholds);
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// 3. Boundary behaviour
// ---------------------------------------------------------------------------

#[test]
fn test_all_null_series_degrade_gracefully() {
    let body = json!({
        "hourly": {
            "time": ["2024-07-14T00:00", "2024-07-14T01:00"],
            "temperature_2m": [null, null],
            "relativehumidity_2m": [null, null],
            "windspeed_10m": [null, null]
        }
    })
    .to_string();
    let bundle = open_meteo::parse_response(&body).expect("nulls are valid input");

    assert_eq!(compute_stats(bundle.values(Variable::Temperature)), None);
    assert!(evaluate_alerts(&bundle, &AlertThresholds::default()).is_empty());
    assert_eq!(
        pearson(bundle.values(Variable::Temperature), bundle.values(Variable::RelativeHumidity)),
        0.0
    );

    let report = analyze_bundle(&bundle, context(QueryMode::Forecast), &AlertThresholds::default());
    assert!(report.stats.is_empty());
    assert!(report.insights.is_empty());
    assert_eq!(report.summary.mean_temperature, None);
    assert_eq!(report.risk_level, RiskLevel::Low);
    assert!(render_text(&report).contains("Avg. Temp.     N/A°C"));
}

#[test]
fn test_misaligned_series_is_invalid_input() {
    let body = json!({
        "hourly": {
            "time": ["2024-07-14T00:00", "2024-07-14T01:00"],
            "surface_pressure": [1012.0]
        }
    })
    .to_string();
    match open_meteo::parse_response(&body) {
        Err(FetchError::Invalid(AnalysisError::InvalidInput(msg))) => {
            assert!(msg.contains("surface_pressure"), "message should name the series: {}", msg)
        }
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}
