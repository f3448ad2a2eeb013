//! Hourly weather analysis for a fixed set of locations.
//!
//! Fetches Open-Meteo forecast or archive series, then derives descriptive
//! statistics, Pearson correlations, threshold alerts and trend patterns.
//! The analysis modules (`analysis`, `alert`) are pure functions over a
//! [`model::TimeSeriesBundle`]; `ingest` adapts the API response into a
//! bundle and `report` renders the results.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod locations;
pub mod logging;
pub mod model;
pub mod report;
pub mod verify;
