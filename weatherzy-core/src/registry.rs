use crate::model::{CityMarker, Coordinate};

/// Initial map centre (geographic centre of India) and zoom.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(20.5937, 78.9629);
pub const DEFAULT_ZOOM: u8 = 3;

/// Zoom used when panning to a searched location.
pub const SEARCH_ZOOM: u8 = 6;

const SEED_CITIES: [(&str, f64, f64); 6] = [
    ("Mumbai", 19.0760, 72.8777),
    ("Delhi", 28.6139, 77.2090),
    ("Bengaluru", 12.9716, 77.5946),
    ("Chennai", 13.0827, 80.2707),
    ("Kolkata", 22.5726, 88.3639),
    ("Hyderabad", 17.3850, 78.4867),
];

/// Cities pre-populated as markers when a map is mounted.
pub fn seed_cities() -> Vec<CityMarker> {
    SEED_CITIES.iter().map(|&(name, lat, lon)| CityMarker::new(name, lat, lon)).collect()
}
