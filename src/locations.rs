/// Location registry for the weather analysis service.
///
/// Defines the fixed set of geographic points that can be queried, with
/// their coordinates. This is the single source of truth for location ids;
/// the CLI and the verification run resolve points from here rather than
/// accepting raw coordinates.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Location metadata
// ---------------------------------------------------------------------------

/// A queryable point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Short id used on the command line.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

impl Location {
    /// Coordinates formatted the way the summary panel shows them.
    pub fn coordinates_label(&self) -> String {
        format!("[{}, {}]", self.latitude, self.longitude)
    }
}

/// All monitored points, in menu order.
pub static LOCATION_REGISTRY: &[Location] = &[
    Location {
        id: "1",
        name: "Madrid",
        latitude: 40.4168,
        longitude: -3.7038,
    },
    Location {
        id: "2",
        name: "Barcelona",
        latitude: 41.3874,
        longitude: 2.1686,
    },
    Location {
        id: "3",
        name: "Valencia",
        latitude: 39.4699,
        longitude: -0.3763,
    },
    Location {
        id: "4",
        name: "Sevilla",
        latitude: 37.3891,
        longitude: -5.9845,
    },
    Location {
        id: "5",
        name: "Bilbao",
        latitude: 43.2630,
        longitude: -2.9350,
    },
    Location {
        id: "6",
        name: "Zaragoza",
        latitude: 41.6488,
        longitude: -0.8891,
    },
];

/// Returns the ids of all registered locations.
pub fn all_location_ids() -> Vec<&'static str> {
    LOCATION_REGISTRY.iter().map(|l| l.id).collect()
}

/// Looks up a location by id. Returns `None` if not found.
pub fn find_location(id: &str) -> Option<&'static Location> {
    LOCATION_REGISTRY.iter().find(|l| l.id == id.trim())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
