/// Data acquisition from external weather APIs.
///
/// Submodules:
/// - `open_meteo` — Open-Meteo forecast/archive client and bundle adapter.

pub mod open_meteo;
