use crate::point::{AsPoint, DerivedPoint, GeoPoint};
use crate::reducer::{Max, Merge, Min};
use time::{Duration, OffsetDateTime};

/// Bounding box over point coordinates, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BBox {
    /// Reducer identity. Never returned from a query: an empty point set has no box.
    pub const EMPTY: BBox = BBox {
        lat_min: f64::INFINITY,
        lat_max: f64::NEG_INFINITY,
        lon_min: f64::INFINITY,
        lon_max: f64::NEG_INFINITY,
    };

    pub fn of_point(point: &GeoPoint) -> Self {
        BBox {
            lat_min: point.lat,
            lat_max: point.lat,
            lon_min: point.lon,
            lon_max: point.lon,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lat_min > self.lat_max || self.lon_min > self.lon_max
    }

    /// `None` for the empty box.
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl Merge for BBox {
    fn empty() -> Self {
        BBox::EMPTY
    }

    fn merge(self, other: Self) -> Self {
        BBox {
            lat_min: self.lat_min.min(other.lat_min),
            lat_max: self.lat_max.max(other.lat_max),
            lon_min: self.lon_min.min(other.lon_min),
            lon_max: self.lon_max.max(other.lon_max),
        }
    }
}

/// Earliest and latest timestamp among points that have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpan {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl TimeSpan {
    pub fn of_point(point: &GeoPoint) -> Self {
        TimeSpan {
            start: point.time,
            end: point.time,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        Some(self.end? - self.start?)
    }
}

impl Merge for TimeSpan {
    fn empty() -> Self {
        TimeSpan::default()
    }

    fn merge(self, other: Self) -> Self {
        TimeSpan {
            start: earliest(self.start, other.start),
            end: latest(self.end, other.end),
        }
    }
}

fn earliest(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Option<OffsetDateTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn latest(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Option<OffsetDateTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Speed statistics over a set of derived points.
///
/// The instantaneous-speed figures (`min`, `max`, `sum`, [`avg`](Self::avg)) only look at
/// moving points. The average-speed figures (`avg_min`, `avg_max`, `avg_sum`,
/// [`avg_avg`](Self::avg_avg)) look at every point, including stills and segment origins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedInfo<'a> {
    pub moving: usize,
    pub still: usize,
    pub total: usize,
    pub min: Min<'a, DerivedPoint>,
    pub max: Max<'a, DerivedPoint>,
    pub sum: f64,
    pub avg_min: Min<'a, DerivedPoint>,
    pub avg_max: Max<'a, DerivedPoint>,
    pub avg_sum: f64,
}

impl<'a> SpeedInfo<'a> {
    pub fn of_point(p: &'a DerivedPoint) -> Self {
        let mut info = SpeedInfo {
            total: 1,
            avg_min: Min::of(p.avg_speed, p),
            avg_max: Max::of(p.avg_speed, p),
            avg_sum: p.avg_speed,
            ..SpeedInfo::empty()
        };

        match p.as_point().speed {
            Some(speed) if p.as_point().is_moving() => {
                info.moving = 1;
                info.min = Min::of(speed, p);
                info.max = Max::of(speed, p);
                info.sum = speed;
            }
            _ => info.still = 1,
        }

        info
    }

    /// Mean instantaneous speed of moving points, `0.0` when nothing moved.
    pub fn avg(&self) -> f64 {
        if self.moving == 0 {
            return 0.0;
        }
        self.sum / self.moving as f64
    }

    /// Mean derived average speed over all points, `0.0` for an empty set.
    pub fn avg_avg(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.avg_sum / self.total as f64
    }
}

impl Merge for SpeedInfo<'_> {
    fn empty() -> Self {
        SpeedInfo {
            moving: 0,
            still: 0,
            total: 0,
            min: Min::empty(),
            max: Max::empty(),
            sum: 0.0,
            avg_min: Min::empty(),
            avg_max: Max::empty(),
            avg_sum: 0.0,
        }
    }

    fn merge(self, other: Self) -> Self {
        SpeedInfo {
            moving: self.moving + other.moving,
            still: self.still + other.still,
            total: self.total + other.total,
            min: self.min.merge(other.min),
            max: self.max.merge(other.max),
            sum: self.sum + other.sum,
            avg_min: self.avg_min.merge(other.avg_min),
            avg_max: self.avg_max.merge(other.avg_max),
            avg_sum: self.avg_sum + other.avg_sum,
        }
    }
}
