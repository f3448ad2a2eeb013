/// Statistical analysis over a weather time-series bundle.
///
/// Every function here is pure and synchronous: a bundle goes in, value
/// objects come out, and nothing is cached between calls.
///
/// Submodules:
/// - `stats` — descriptive statistics for one series with missing readings.
/// - `correlation` — Pearson matrix and ranked correlation insights.
/// - `patterns` — trend, accumulation, variability and stability summaries.

pub mod correlation;
pub mod patterns;
pub mod stats;

pub use correlation::{
    CorrelationCell, CorrelationInsight, build_correlation_matrix, correlation_insights, pearson,
    rank_significant_correlations,
};
pub use patterns::{Pattern, PatternKind, analyze_patterns};
pub use stats::{StatsResult, compute_stats};
