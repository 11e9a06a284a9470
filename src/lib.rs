use std::error::Error;

pub mod ingest;
pub mod point;
pub mod reducer;
pub mod segment;
pub mod stats;
pub mod track;

pub use ingest::{RawRecord, TrackRecords};
pub use point::{AsPoint, DerivedPoint, EARTH_RADIUS, GeoPoint, haversine_distance};
pub use segment::{DerivedSegment, Segment};
pub use stats::{BBox, SpeedInfo, TimeSpan};
pub use track::{DerivedTrack, Track};

/// Parses a sphere radius such as `6371000`, `6371000m` or `6371km` into meters.
pub fn parse_radius(s: &str) -> Result<f64, Box<dyn Error>> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Empty radius".into());
    }

    let (num_str, scale) = if let Some(km) = s.strip_suffix("km") {
        (km, 1000.0)
    } else if let Some(m) = s.strip_suffix('m') {
        (m, 1.0)
    } else {
        (s, 1.0)
    };

    let radius = num_str.trim().parse::<f64>()? * scale;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(format!("Radius must be a positive distance: {s}").into());
    }

    Ok(radius)
}
