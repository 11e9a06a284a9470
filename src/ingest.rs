//! Canonical parsed records and the adapter from `gpx` crate documents.
//!
//! Parsers reduce a document to [`TrackRecords`]; everything past this point works on
//! [`RawRecord`] only, whatever produced it.

use gpx::{Gpx, Waypoint};
use log::debug;
use time::OffsetDateTime;

/// One `<trkpt>` as it came out of a parser. Latitude and longitude may be missing;
/// such records are dropped when the segment is assembled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub time: Option<OffsetDateTime>,
    pub speed: Option<f64>,
}

/// Records of one `<trk>`, grouped by `<trkseg>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackRecords {
    pub name: Option<String>,
    pub segments: Vec<Vec<RawRecord>>,
}

pub fn record_from_waypoint(waypoint: &Waypoint) -> RawRecord {
    let point = waypoint.point();
    RawRecord {
        lat: Some(point.y()),
        lon: Some(point.x()),
        time: waypoint.time.clone().map(OffsetDateTime::from),
        speed: waypoint.speed,
    }
}

pub fn tracks_from_gpx(gpx: &Gpx) -> Vec<TrackRecords> {
    debug!("gpx document holds {} track(s)", gpx.tracks.len());

    gpx.tracks
        .iter()
        .map(|track| TrackRecords {
            name: track.name.clone(),
            segments: track
                .segments
                .iter()
                .map(|segment| segment.points.iter().map(record_from_waypoint).collect())
                .collect(),
        })
        .collect()
}
