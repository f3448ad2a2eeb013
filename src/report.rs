//! Assembles every analysis output for one query and renders it as text.
//!
//! This is the presentation collaborator of the analysis engine: it owns
//! nothing between calls and only formats the value objects it is given.

use std::fmt::Write as _;

use serde::Serialize;

use crate::alert::{Alert, AlertThresholds, RiskLevel, evaluate_alerts, risk_level};
use crate::analysis::correlation::{
    CorrelationCell, CorrelationInsight, build_correlation_matrix, correlation_insights,
    rank_significant_correlations,
};
use crate::analysis::patterns::{Pattern, analyze_patterns, precipitation_totals};
use crate::analysis::stats::{StatsResult, compute_stats, mean_of, range_of};
use crate::ingest::open_meteo::DateRange;
use crate::locations::Location;
use crate::model::{QueryMode, TimeSeriesBundle, Variable};

/// Variables shown on the statistics panel, in display order.
pub const STATS_PANEL_VARIABLES: [Variable; 4] = [
    Variable::Temperature,
    Variable::RelativeHumidity,
    Variable::WindSpeed,
    Variable::SurfacePressure,
];

/// Where and when a bundle was fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryContext {
    pub location: Location,
    pub range: DateRange,
    pub mode: QueryMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableStats {
    pub variable: Variable,
    pub unit: &'static str,
    pub stats: StatsResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub title: String,
    pub period: String,
    /// °C; `None` when no temperature reading is valid.
    pub mean_temperature: Option<f64>,
    /// mm
    pub total_rain: f64,
    /// km/h; `None` when no gust reading is valid.
    pub max_wind_gust: Option<f64>,
    pub risk_level: RiskLevel,
}

/// Everything derived from one bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub context: QueryContext,
    pub samples: usize,
    pub summary: ExecutiveSummary,
    pub stats: Vec<VariableStats>,
    pub alerts: Vec<Alert>,
    pub risk_level: RiskLevel,
    pub patterns: Vec<Pattern>,
    pub correlation_matrix: Vec<CorrelationCell>,
    pub insights: Vec<CorrelationInsight>,
}

/// Runs every analysis over `bundle`.
pub fn analyze_bundle(
    bundle: &TimeSeriesBundle,
    context: QueryContext,
    thresholds: &AlertThresholds,
) -> AnalysisReport {
    let alerts = evaluate_alerts(bundle, thresholds);
    let risk = risk_level(&alerts);
    let matrix = build_correlation_matrix(bundle);
    let insights = correlation_insights(&rank_significant_correlations(&matrix));

    AnalysisReport {
        summary: executive_summary(bundle, risk, &context),
        samples: bundle.len(),
        stats: variable_stats(bundle),
        patterns: analyze_patterns(bundle, context.mode),
        alerts,
        risk_level: risk,
        correlation_matrix: matrix,
        insights,
        context,
    }
}

/// Statistics for every variable with at least one valid reading.
pub fn variable_stats(bundle: &TimeSeriesBundle) -> Vec<VariableStats> {
    Variable::ALL
        .into_iter()
        .filter_map(|variable| {
            compute_stats(bundle.values(variable)).map(|stats| VariableStats {
                variable,
                unit: variable.unit(),
                stats,
            })
        })
        .collect()
}

pub fn executive_summary(
    bundle: &TimeSeriesBundle,
    risk_level: RiskLevel,
    context: &QueryContext,
) -> ExecutiveSummary {
    let coordinates = context.location.coordinates_label();
    let (title, period) = match context.mode {
        QueryMode::Forecast => (
            "🔮 Weather Forecast",
            format!(
                "Forecast for the next {} days from {} to {} at coordinate {}",
                context.range.days(),
                context.range.start,
                context.range.end,
                coordinates
            ),
        ),
        QueryMode::Historical => (
            "📋 Executive Summary",
            format!(
                "From 00:00 on {} to 23:59 on {} at coordinate {}",
                context.range.start, context.range.end, coordinates
            ),
        ),
    };

    ExecutiveSummary {
        title: title.to_string(),
        period,
        mean_temperature: mean_of(Variable::Temperature, bundle.values(Variable::Temperature)).ok(),
        total_rain: precipitation_totals(bundle).0,
        max_wind_gust: range_of(Variable::WindGusts, bundle.values(Variable::WindGusts))
            .ok()
            .map(|(_, max)| max),
        risk_level,
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

fn or_na(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Renders the report as the console panels.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let forecast = report.context.mode == QueryMode::Forecast;
    let summary = &report.summary;

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "{}", summary.title);
    let _ = writeln!(out, "{} ({})", report.context.location.name, summary.period);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Avg. Temp.     {}°C", or_na(summary.mean_temperature, 1));
    let _ = writeln!(
        out,
        "  {:<14} {:.1}mm",
        if forecast { "Expected Rain" } else { "Total Rain" },
        summary.total_rain
    );
    let _ = writeln!(
        out,
        "  {:<14} {} km/h",
        if forecast { "Expected Wind" } else { "Max Wind" },
        or_na(summary.max_wind_gust, 0)
    );
    let _ = writeln!(out, "  Risk Level     {}", summary.risk_level);

    let _ = writeln!(out, "\nStatistics");
    for entry in report
        .stats
        .iter()
        .filter(|s| STATS_PANEL_VARIABLES.contains(&s.variable))
    {
        let _ = writeln!(
            out,
            "  {:<18} avg {:.1}{}  (Min: {:.1} | Max: {:.1})",
            entry.variable.label(),
            entry.stats.mean,
            entry.unit,
            entry.stats.min,
            entry.stats.max
        );
    }

    let _ = writeln!(out, "\nAlerts");
    if report.alerts.is_empty() {
        let _ = writeln!(out, "  ✅ No weather alerts");
    }
    for alert in &report.alerts {
        let _ = writeln!(out, "  {} [{:?}] {}", alert.icon(), alert.severity, alert.message);
    }

    let _ = writeln!(out, "\nPatterns");
    for pattern in &report.patterns {
        let _ = writeln!(out, "  {}: {}", pattern.title, pattern.value);
    }

    let _ = writeln!(out, "\nCorrelations");
    if report.insights.is_empty() {
        let _ = writeln!(out, "  No significant correlations found");
    }
    for insight in &report.insights {
        let _ = writeln!(
            out,
            "  {:<36} {}  {}",
            insight.title(),
            insight.value_text(),
            insight.strength.description()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::find_location;
    use chrono::NaiveDate;

    fn context(mode: QueryMode) -> QueryContext {
        QueryContext {
            location: find_location("1").unwrap().clone(),
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            },
            mode,
        }
    }

    fn bundle() -> TimeSeriesBundle {
        let start = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap().and_hms_opt(0, 0, 0).unwrap();
        TimeSeriesBundle::hourly(start, 4)
            .with_series(Variable::Temperature, vec![Some(31.0), Some(29.0), None, Some(24.0)])
            .unwrap()
            .with_series(Variable::Rain, vec![Some(0.0), Some(2.0), Some(1.0), None])
            .unwrap()
            .with_series(Variable::DewPoint, vec![Some(15.0), Some(14.0), None, Some(11.0)])
            .unwrap()
    }

    #[test]
    fn test_summary_values() {
        let summary = executive_summary(&bundle(), RiskLevel::High, &context(QueryMode::Historical));
        assert_eq!(summary.title, "📋 Executive Summary");
        assert_eq!(
            summary.period,
            "From 00:00 on 2024-04-30 to 23:59 on 2024-05-01 at coordinate [40.4168, -3.7038]"
        );
        assert_eq!(summary.mean_temperature, Some(28.0));
        assert_eq!(summary.total_rain, 3.0);
        assert_eq!(summary.max_wind_gust, None);
    }

    #[test]
    fn test_forecast_period_quotes_range_length() {
        let mut forecast = context(QueryMode::Forecast);
        forecast.range.end = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let summary = executive_summary(&bundle(), RiskLevel::Low, &forecast);
        assert_eq!(summary.title, "🔮 Weather Forecast");
        assert_eq!(
            summary.period,
            "Forecast for the next 4 days from 2024-04-30 to 2024-05-03 at coordinate [40.4168, -3.7038]"
        );
    }

    #[test]
    fn test_missing_rain_reports_positive_zero() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let dry = TimeSeriesBundle::hourly(start, 2)
            .with_series(Variable::Temperature, vec![Some(12.0), Some(14.0)])
            .unwrap();
        let report = analyze_bundle(&dry, context(QueryMode::Historical), &AlertThresholds::default());
        assert!(report.summary.total_rain.is_sign_positive());

        let text = render_text(&report);
        assert!(text.contains("Total Rain     0.0mm"));
        assert!(text.contains("Rain: 0.0mm | Snow: 0.0cm"));
        assert!(!text.contains("-0.0"));

        let json = serde_json::to_string(&report).expect("report serializes");
        assert!(json.contains("\"total_rain\":0.0"));
    }

    #[test]
    fn test_report_collects_every_output() {
        let report = analyze_bundle(&bundle(), context(QueryMode::Forecast), &AlertThresholds::default());
        assert_eq!(report.samples, 4);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.patterns.len(), 4);
        assert_eq!(report.correlation_matrix.len(), 49);
        let stat_vars: Vec<_> = report.stats.iter().map(|s| s.variable).collect();
        assert_eq!(stat_vars, vec![Variable::Temperature, Variable::Rain, Variable::DewPoint]);
        // Temperature and dew point move together.
        assert!(report.insights.iter().any(|i| i.title() == "Temperature ↔ Dew Point"));
    }

    #[test]
    fn test_render_text_shows_na_and_panels() {
        let report = analyze_bundle(&bundle(), context(QueryMode::Historical), &AlertThresholds::default());
        let text = render_text(&report);
        assert!(text.starts_with("📋 Executive Summary\nMadrid"));
        assert!(text.contains("Max Wind       N/A km/h"));
        assert!(text.contains("Risk Level     HIGH"));
        assert!(text.contains("High temperature: 31.0°C"));
        assert!(text.contains("Temperature Trend (48h): Descending -7.0°C"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = analyze_bundle(&bundle(), context(QueryMode::Forecast), &AlertThresholds::default());
        let json = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(json["risk_level"], "HIGH");
        assert_eq!(json["context"]["mode"], "forecast");
        assert_eq!(json["alerts"][0]["category"], "heat");
        assert_eq!(json["patterns"].as_array().map(Vec::len), Some(4));
    }
}
