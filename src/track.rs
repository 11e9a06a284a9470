use crate::ingest::TrackRecords;
use crate::point::{AsPoint, DerivedPoint, EARTH_RADIUS, GeoPoint};
use crate::reducer::fold;
use crate::segment::Segment;
use crate::stats::{BBox, SpeedInfo, TimeSpan};
use log::debug;

/// One recorded activity. Segments may be separated by gaps; no distance or time
/// delta is ever taken across a segment boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<P = GeoPoint> {
    pub name: Option<String>,
    segments: Vec<Segment<P>>,
}

pub type DerivedTrack = Track<DerivedPoint>;

impl<P> Default for Track<P> {
    fn default() -> Self {
        Track {
            name: None,
            segments: Vec::new(),
        }
    }
}

impl Track<GeoPoint> {
    /// Assembles a track from parsed records. Invalid records are dropped, and so are
    /// segments that end up with no points.
    pub fn from_record_segments(records: &TrackRecords) -> Self {
        let segments: Vec<Segment> = records
            .segments
            .iter()
            .map(Segment::from_records)
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.len() < records.segments.len() {
            debug!(
                "dropped {} segment(s) without valid points",
                records.segments.len() - segments.len()
            );
        }

        Track::new(segments).with_name(records.name.clone())
    }
}

impl<P> Track<P> {
    pub fn new(segments: Vec<Segment<P>>) -> Self {
        Track {
            name: None,
            segments,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn segments(&self) -> &[Segment<P>] {
        &self.segments
    }

    pub fn total_points(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }

    /// First point of the first non-empty segment.
    pub fn first_point(&self) -> Option<&P> {
        self.segments.iter().find_map(Segment::first_point)
    }

    /// Last point of the last non-empty segment.
    pub fn last_point(&self) -> Option<&P> {
        self.segments.iter().rev().find_map(Segment::last_point)
    }

    /// All points in recording order, segment boundaries erased.
    pub fn points(&self) -> impl Iterator<Item = &P> {
        self.segments.iter().flat_map(|segment| segment.points())
    }
}

impl<P: AsPoint> Track<P> {
    pub fn compute_averages(&self) -> DerivedTrack {
        Track {
            name: self.name.clone(),
            segments: self
                .segments
                .iter()
                .map(Segment::compute_averages)
                .collect(),
        }
    }

    /// Sum of the segment distances in meters, with no leg between segments.
    pub fn total_distance(&self) -> f64 {
        self.total_distance_with_radius(EARTH_RADIUS)
    }

    pub fn total_distance_with_radius(&self, radius: f64) -> f64 {
        self.segments
            .iter()
            .map(|segment| segment.total_distance_with_radius(radius))
            .sum()
    }

    /// `None` when the track holds no points.
    pub fn bbox(&self) -> Option<BBox> {
        fold::<BBox, _>(self.segments.iter().map(Segment::bbox_acc)).non_empty()
    }

    pub fn time_info(&self) -> TimeSpan {
        fold(self.segments.iter().map(Segment::time_info))
    }
}

impl DerivedTrack {
    /// Merge of the per-segment statistics.
    pub fn speed_info(&self) -> SpeedInfo<'_> {
        fold(self.segments.iter().map(Segment::speed_info))
    }
}
