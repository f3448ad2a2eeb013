/// Rule-based weather alerting.
///
/// Submodules:
/// - `thresholds` — threshold rules, alert levels and the aggregate risk label.

pub mod thresholds;

pub use thresholds::{Alert, AlertCategory, AlertSeverity, AlertThresholds, RiskLevel, evaluate_alerts, risk_level};
