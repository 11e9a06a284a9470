use crate::ingest::RawRecord;
use crate::point::{AsPoint, DerivedPoint, EARTH_RADIUS, GeoPoint};
use crate::reducer::fold;
use crate::stats::{BBox, SpeedInfo, TimeSpan};
use log::warn;

/// A contiguous run of points with no recording gap.
///
/// `Segment<GeoPoint>` holds raw samples; [`compute_averages`](Segment::compute_averages)
/// produces a [`DerivedSegment`] whose points carry distance, elapsed time and average speed
/// relative to their predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<P = GeoPoint> {
    points: Vec<P>,
}

pub type DerivedSegment = Segment<DerivedPoint>;

impl<P> Default for Segment<P> {
    fn default() -> Self {
        Segment { points: Vec::new() }
    }
}

impl Segment<GeoPoint> {
    /// Assembles a segment, dropping records without usable coordinates.
    pub fn from_records<'r, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'r RawRecord>,
    {
        Segment::new(records.into_iter().filter_map(GeoPoint::from_record).collect())
    }
}

impl<P> Segment<P> {
    pub fn new(points: Vec<P>) -> Self {
        Segment { points }
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_point(&self) -> Option<&P> {
        self.points.first()
    }

    pub fn last_point(&self) -> Option<&P> {
        self.points.last()
    }
}

impl<P: AsPoint> Segment<P> {
    /// Derives per-point deltas in one pass. The first point gets zero for every delta.
    ///
    /// Always works from the underlying samples, so deriving an already derived segment
    /// gives the same values again.
    pub fn compute_averages(&self) -> DerivedSegment {
        let mut derived: Vec<DerivedPoint> = Vec::with_capacity(self.points.len());

        for cur in &self.points {
            let cur = cur.as_point().clone();
            let next = match derived.last() {
                None => DerivedPoint::origin(cur),
                Some(prev) => DerivedPoint::after(&prev.point, cur),
            };
            derived.push(next);
        }

        let derived = Segment::new(derived);
        let untimed = derived.untimed_pairs();
        if untimed > 0 {
            warn!(
                "{untimed} of {} point pair(s) without timestamps, average speed is undefined",
                derived.len().saturating_sub(1)
            );
        }
        derived
    }

    /// Sum of great-circle distances between consecutive points, in meters.
    ///
    /// Recomputed from coordinates; does not rely on derived fields.
    pub fn total_distance(&self) -> f64 {
        self.total_distance_with_radius(EARTH_RADIUS)
    }

    pub fn total_distance_with_radius(&self, radius: f64) -> f64 {
        self.points
            .windows(2)
            .map(|pair| {
                pair[0]
                    .as_point()
                    .distance_to_with_radius(pair[1].as_point(), radius)
            })
            .sum()
    }

    /// `None` when the segment holds no points.
    pub fn bbox(&self) -> Option<BBox> {
        self.bbox_acc().non_empty()
    }

    pub(crate) fn bbox_acc(&self) -> BBox {
        fold(self.points.iter().map(|p| BBox::of_point(p.as_point())))
    }

    pub fn time_info(&self) -> TimeSpan {
        fold(self.points.iter().map(|p| TimeSpan::of_point(p.as_point())))
    }
}

impl DerivedSegment {
    /// Consecutive pairs where either point lacks a timestamp.
    pub(crate) fn untimed_pairs(&self) -> usize {
        self.points
            .windows(2)
            .filter(|pair| pair[0].point.time.is_none() || pair[1].point.time.is_none())
            .count()
    }

    pub fn speed_info(&self) -> SpeedInfo<'_> {
        fold(self.points.iter().map(SpeedInfo::of_point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    const T0: OffsetDateTime = datetime!(2023-01-01 10:00:00 UTC);

    fn point(lat: f64, lon: f64, secs: i64, speed: Option<f64>) -> GeoPoint {
        GeoPoint {
            lat,
            lon,
            time: Some(T0 + Duration::seconds(secs)),
            speed,
        }
    }

    fn scenario() -> Segment {
        Segment::new(vec![
            point(52.0, 5.0, 0, Some(0.0)),
            point(52.001, 5.0, 10, Some(2.0)),
            point(52.002, 5.0, 20, None),
            point(52.003, 5.0, 30, Some(1.0)),
        ])
    }

    #[test]
    fn test_compute_averages_origin_is_zero() {
        let derived = scenario().compute_averages();
        let first = derived.first_point().unwrap();
        assert_eq!(first.dist, 0.0);
        assert_eq!(first.dtime, 0.0);
        assert_eq!(first.avg_speed, 0.0);
    }

    #[test]
    fn test_compute_averages_single_point() {
        let segment = Segment::new(vec![GeoPoint::new(1.0, 2.0)]);
        let derived = segment.compute_averages();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived.points()[0].avg_speed, 0.0);
    }

    #[test]
    fn test_compute_averages_is_repeatable() {
        let once = scenario().compute_averages();
        let twice = once.compute_averages();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let derived = scenario().compute_averages();

        for p in &derived.points()[1..] {
            assert_eq!(p.dtime, 10.0);
            assert!((p.dist - 111.19).abs() < 0.1, "dist {}", p.dist);
            assert!((p.avg_speed - 11.119).abs() < 0.01, "avg {}", p.avg_speed);
        }

        let info = derived.speed_info();
        assert_eq!(info.still, 2);
        assert_eq!(info.moving, 2);
        assert_eq!(info.total, 4);
        assert_eq!(info.min.value, 1.0);
        assert_eq!(info.min.at, Some(&derived.points()[3]));
        assert_eq!(info.max.value, 2.0);
        assert_eq!(info.max.at, Some(&derived.points()[1]));
        assert_eq!(info.sum, 3.0);
        assert_eq!(info.avg(), 1.5);

        // The origin point's zero average counts towards the all-points figures.
        assert_eq!(info.avg_min.value, 0.0);
        assert_eq!(info.avg_min.at, Some(&derived.points()[0]));
        assert!((info.avg_max.value - 11.119).abs() < 0.01);
        let expected_avg_avg = derived.points().iter().map(|p| p.avg_speed).sum::<f64>() / 4.0;
        assert!((info.avg_avg() - expected_avg_avg).abs() < 1e-9);
    }

    #[test]
    fn test_missing_time_propagates_nan() {
        let segment = Segment::new(vec![
            point(52.0, 5.0, 0, Some(1.0)),
            GeoPoint::new(52.001, 5.0).with_speed(1.0),
            point(52.002, 5.0, 20, Some(1.0)),
        ]);
        let derived = segment.compute_averages();
        assert!(derived.points()[1].avg_speed.is_nan());
        assert!(derived.points()[2].avg_speed.is_nan());

        let info = derived.speed_info();
        assert!(info.avg_sum.is_nan());
        assert_eq!(info.avg_max.at, Some(&derived.points()[0]));
    }

    #[test]
    fn test_untimed_pairs() {
        let segment = Segment::new(vec![
            point(52.0, 5.0, 0, None),
            GeoPoint::new(52.001, 5.0),
            point(52.002, 5.0, 20, None),
            point(52.003, 5.0, 30, None),
        ]);
        assert_eq!(segment.compute_averages().untimed_pairs(), 2);
        assert_eq!(DerivedSegment::default().untimed_pairs(), 0);
    }

    #[test]
    fn test_duplicate_timestamp_is_infinite_max() {
        let segment = Segment::new(vec![
            point(52.0, 5.0, 0, None),
            point(52.001, 5.0, 0, None),
        ]);
        let derived = segment.compute_averages();
        let info = derived.speed_info();
        assert_eq!(info.avg_max.value, f64::INFINITY);
        assert_eq!(info.avg_max.at, Some(&derived.points()[1]));
    }

    #[test]
    fn test_total_distance_without_derive() {
        let segment = scenario();
        let expected = 3.0 * GeoPoint::new(52.0, 5.0).distance_to(&GeoPoint::new(52.001, 5.0));
        assert!((segment.total_distance() - expected).abs() < 0.01);
        assert_eq!(segment.total_distance(), segment.compute_averages().total_distance());
    }

    #[test]
    fn test_bbox_and_time_info() {
        let segment = scenario();
        let bbox = segment.bbox().unwrap();
        assert_eq!(bbox.lat_min, 52.0);
        assert_eq!(bbox.lat_max, 52.003);
        assert_eq!(bbox.lon_min, 5.0);
        assert_eq!(bbox.lon_max, 5.0);

        let span = segment.time_info();
        assert_eq!(span.start, Some(T0));
        assert_eq!(span.end, Some(T0 + Duration::seconds(30)));
    }

    #[test]
    fn test_empty_segment() {
        let segment: Segment = Segment::default();
        assert!(segment.first_point().is_none());
        assert!(segment.last_point().is_none());
        assert_eq!(segment.total_distance(), 0.0);
        assert!(segment.bbox().is_none());
        assert_eq!(segment.time_info(), TimeSpan::default());

        let derived = segment.compute_averages();
        let info = derived.speed_info();
        assert_eq!(info.total, 0);
        assert_eq!(info.avg(), 0.0);
    }

    #[test]
    fn test_from_records_drops_incomplete() {
        let records = vec![
            RawRecord {
                lat: Some(52.0),
                lon: Some(5.0),
                ..Default::default()
            },
            RawRecord {
                lat: Some(52.0),
                ..Default::default()
            },
            RawRecord {
                lat: Some(52.1),
                lon: Some(5.1),
                speed: Some(3.0),
                ..Default::default()
            },
        ];
        let segment = Segment::from_records(&records);
        assert_eq!(segment.len(), 2);
        assert_eq!(segment.last_point().unwrap().speed, Some(3.0));
    }
}
