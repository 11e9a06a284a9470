use crate::ingest::RawRecord;
use time::OffsetDateTime;

/// Mean Earth radius in meters (WGS84: 6371008.8m).
pub const EARTH_RADIUS: f64 = 6371000.0;

/// Calculates the great circle distance between two GPS coordinates using the haversine formula.
///
/// The sphere radius is given in meters and must be positive. The result is in the same unit.
/// Near-antipodal inputs lose precision; no attempt is made to correct for that.
///
/// References:
/// - R.W. Sinnott, "Virtues of the Haversine", Sky and Telescope, vol. 68, no. 2, 1984, p. 159
/// - https://www.movable-type.co.uk/scripts/latlong.html
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    debug_assert!(radius > 0.0, "sphere radius must be positive");

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    // a = sin²(Δφ/2) + cos φ1 ⋅ cos φ2 ⋅ sin²(Δλ/2)
    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    // c = 2 ⋅ atan2(√a, √(1−a))
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

/// A single recorded sample: position, optional timestamp and optional device-reported speed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub time: Option<OffsetDateTime>,
    /// Instantaneous speed in m/s as reported by the device, never derived.
    pub speed: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint {
            lat,
            lon,
            time: None,
            speed: None,
        }
    }

    pub fn with_time(mut self, time: OffsetDateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Builds a point from a parsed record, or `None` when latitude or longitude is
    /// missing or not finite.
    pub fn from_record(record: &RawRecord) -> Option<Self> {
        match (record.lat, record.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(GeoPoint {
                lat,
                lon,
                time: record.time,
                speed: record.speed,
            }),
            _ => None,
        }
    }

    /// Great-circle distance in meters on a sphere of mean Earth radius.
    pub fn distance_to(&self, to: &GeoPoint) -> f64 {
        self.distance_to_with_radius(to, EARTH_RADIUS)
    }

    pub fn distance_to_with_radius(&self, to: &GeoPoint, radius: f64) -> f64 {
        haversine_distance(self.lat, self.lon, to.lat, to.lon, radius)
    }

    /// A point counts as moving only when it carries a non-zero speed reading.
    /// A missing reading and a reading of exactly zero are both "still".
    pub fn is_moving(&self) -> bool {
        matches!(self.speed, Some(s) if s != 0.0 && !s.is_nan())
    }
}

/// A point after the derive step, carrying the deltas to its predecessor in the segment.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPoint {
    pub point: GeoPoint,
    /// Meters from the previous point.
    pub dist: f64,
    /// Seconds from the previous point. NaN when either timestamp is missing.
    pub dtime: f64,
    /// `dist / dtime`; infinite for equal timestamps, NaN for missing ones.
    pub avg_speed: f64,
}

impl DerivedPoint {
    /// The first point of a segment: all deltas are zero.
    pub fn origin(point: GeoPoint) -> Self {
        DerivedPoint {
            point,
            dist: 0.0,
            dtime: 0.0,
            avg_speed: 0.0,
        }
    }

    pub fn after(prev: &GeoPoint, point: GeoPoint) -> Self {
        let dist = prev.distance_to(&point);
        let dtime = match (prev.time, point.time) {
            (Some(start), Some(end)) => (end - start).as_seconds_f64(),
            _ => f64::NAN,
        };

        DerivedPoint {
            point,
            dist,
            dtime,
            avg_speed: dist / dtime,
        }
    }
}

/// Access to the geographic sample behind any point representation.
pub trait AsPoint {
    fn as_point(&self) -> &GeoPoint;
}

impl AsPoint for GeoPoint {
    fn as_point(&self) -> &GeoPoint {
        self
    }
}

impl AsPoint for DerivedPoint {
    fn as_point(&self) -> &GeoPoint {
        &self.point
    }
}
