use gpxstats::{RawRecord, TrackRecords};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::error::Error;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    TrackName,
    Time,
    Speed,
}

/// Streams a GPX document into per-track, per-segment records.
///
/// Reads `lat`/`lon` attributes, `<time>`, and `<speed>` whether it sits directly in the
/// `<trkpt>` or inside its `<extensions>`. Unparseable values are left empty rather than
/// failing the document; only malformed XML is an error.
pub fn extract_tracks(input: &[u8]) -> Result<Vec<TrackRecords>, Box<dyn Error>> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut tracks = Vec::new();

    let mut track: Option<TrackRecords> = None;
    let mut segment: Option<Vec<RawRecord>> = None;
    let mut record: Option<RawRecord> = None;
    let mut target = TextTarget::None;
    let mut text = String::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Err(e) => {
                return Err(
                    format!("Error at position {}: {:?}", reader.buffer_position(), e).into(),
                );
            }
            Ok(Event::Eof) => break,
            Ok(event) => event.into_owned(),
        };

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"trk" => track = Some(TrackRecords::default()),
                b"trkseg" => {
                    if track.is_some() {
                        segment = Some(Vec::new());
                    }
                }
                b"trkpt" => {
                    if segment.is_some() {
                        record = Some(record_from_attributes(e));
                    }
                }
                b"name" => {
                    if track.is_some() && segment.is_none() {
                        target = TextTarget::TrackName;
                        text.clear();
                    }
                }
                b"time" => {
                    if record.is_some() {
                        target = TextTarget::Time;
                        text.clear();
                    }
                }
                b"speed" => {
                    if record.is_some() {
                        target = TextTarget::Speed;
                        text.clear();
                    }
                }
                _ => {}
            },

            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"trk" => tracks.push(TrackRecords::default()),
                b"trkseg" => {
                    if let Some(track) = track.as_mut() {
                        track.segments.push(Vec::new());
                    }
                }
                b"trkpt" => {
                    if let Some(segment) = segment.as_mut() {
                        segment.push(record_from_attributes(e));
                    }
                }
                _ => {}
            },

            Event::End(ref e) => match e.local_name().as_ref() {
                b"trk" => {
                    if let Some(track) = track.take() {
                        debug!(
                            "read track {:?} with {} segment(s)",
                            track.name,
                            track.segments.len()
                        );
                        tracks.push(track);
                    }
                }
                b"trkseg" => {
                    if let (Some(track), Some(segment)) = (track.as_mut(), segment.take()) {
                        track.segments.push(segment);
                    }
                }
                b"trkpt" => {
                    if let (Some(segment), Some(record)) = (segment.as_mut(), record.take()) {
                        segment.push(record);
                    }
                }
                b"name" | b"time" | b"speed" => {
                    let value = text.trim();
                    match target {
                        TextTarget::TrackName => {
                            if let Some(track) = track.as_mut()
                                && !value.is_empty()
                            {
                                track.name = Some(value.to_string());
                            }
                        }
                        TextTarget::Time => {
                            if let Some(record) = record.as_mut() {
                                record.time = parse_time(value);
                            }
                        }
                        TextTarget::Speed => {
                            if let Some(record) = record.as_mut() {
                                record.speed = value.parse().ok();
                            }
                        }
                        TextTarget::None => {}
                    }
                    target = TextTarget::None;
                }
                _ => {}
            },

            Event::Text(ref e) => {
                if target != TextTarget::None {
                    match e.unescape() {
                        Ok(value) => text.push_str(&value),
                        Err(err) => debug!("skipping undecodable text: {err}"),
                    }
                }
            }

            Event::CData(ref e) => {
                if target != TextTarget::None
                    && let Ok(value) = e.decode()
                {
                    text.push_str(&value);
                }
            }

            _ => {}
        }

        buf.clear();
    }

    Ok(tracks)
}

/// Fills in speeds the `gpx` crate leaves behind in `<extensions>`.
///
/// Streams `input` again and copies each point's speed into the record at the same
/// track, segment and point position, wherever `records` has none yet.
pub fn merge_extension_speeds(
    records: &mut [TrackRecords],
    input: &[u8],
) -> Result<(), Box<dyn Error>> {
    let streamed = extract_tracks(input)?;
    if streamed.len() != records.len() {
        debug!(
            "track count differs ({} vs {}), merging speeds by position",
            records.len(),
            streamed.len()
        );
    }

    let mut filled = 0;
    for (track, source) in records.iter_mut().zip(&streamed) {
        for (segment, source) in track.segments.iter_mut().zip(&source.segments) {
            for (record, source) in segment.iter_mut().zip(source) {
                if record.speed.is_none() && source.speed.is_some() {
                    record.speed = source.speed;
                    filled += 1;
                }
            }
        }
    }
    debug!("filled {filled} speed(s) from extensions");

    Ok(())
}

fn record_from_attributes(e: &BytesStart) -> RawRecord {
    let mut record = RawRecord::default();

    for attr in e.attributes().flatten() {
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"lat" => record.lat = value.trim().parse().ok(),
            b"lon" => record.lon = value.trim().parse().ok(),
            _ => {}
        }
    }

    record
}

fn parse_time(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(
        value,
        &time::format_description::well_known::Iso8601::DEFAULT,
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <metadata>
    <name>Not a track</name>
    <time>2023-01-01T09:00:00Z</time>
  </metadata>
  <trk>
    <name>Test Track</name>
    <trkseg>
      <trkpt lat="37.7749" lon="-122.4194">
        <ele>100</ele>
        <time>2023-01-01T10:00:00Z</time>
        <extensions>
          <speed>2.5</speed>
        </extensions>
      </trkpt>
      <trkpt lat="37.7750" lon="-122.4195">
        <time>2023-01-01T10:00:02Z</time>
        <extensions>
          <ns3:TrackPointExtension xmlns:ns3="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
            <ns3:speed>3.25</ns3:speed>
          </ns3:TrackPointExtension>
        </extensions>
      </trkpt>
      <trkpt lat="37.7751" lon="-122.4196">
        <time>2023-01-01T10:00:10Z</time>
        <speed>1</speed>
      </trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="37.7800" lon="-122.4200"/>
      <trkpt lon="-122.4201">
        <time>not-a-time</time>
        <speed>fast</speed>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_extract_tracks_structure() {
        let tracks = extract_tracks(SAMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name.as_deref(), Some("Test Track"));
        assert_eq!(tracks[0].segments.len(), 2);
        assert_eq!(tracks[0].segments[0].len(), 3);
        assert_eq!(tracks[0].segments[1].len(), 2);
    }

    #[test]
    fn test_extract_tracks_point_fields() {
        let tracks = extract_tracks(SAMPLE_GPX.as_bytes()).unwrap();
        let points = &tracks[0].segments[0];

        assert_eq!(points[0].lat, Some(37.7749));
        assert_eq!(points[0].lon, Some(-122.4194));
        assert_eq!(points[0].time, Some(datetime!(2023-01-01 10:00:00 UTC)));
        assert_eq!(points[0].speed, Some(2.5));
        assert_eq!(points[1].speed, Some(3.25));
        assert_eq!(points[2].speed, Some(1.0));
    }

    #[test]
    fn test_extract_tracks_incomplete_points() {
        let tracks = extract_tracks(SAMPLE_GPX.as_bytes()).unwrap();
        let points = &tracks[0].segments[1];

        assert_eq!(points[0].lat, Some(37.78));
        assert_eq!(points[0].time, None);

        assert_eq!(points[1].lat, None);
        assert_eq!(points[1].lon, Some(-122.4201));
        assert_eq!(points[1].time, None);
        assert_eq!(points[1].speed, None);
    }

    #[test]
    fn test_extract_tracks_decodes_entities() {
        let gpx = r#"<gpx version="1.1" creator="test">
  <trk>
    <name>Tom &amp; Jerry</name>
    <trkseg><trkpt lat="1.0" lon="2.0"/></trkseg>
  </trk>
  <trk>
    <name><![CDATA[Up & Down]]></name>
    <trkseg><trkpt lat="1.0" lon="2.0"/></trkseg>
  </trk>
</gpx>"#;
        let tracks = extract_tracks(gpx.as_bytes()).unwrap();
        assert_eq!(tracks[0].name.as_deref(), Some("Tom & Jerry"));
        assert_eq!(tracks[1].name.as_deref(), Some("Up & Down"));
    }

    #[test]
    fn test_merge_extension_speeds() {
        let mut records = extract_tracks(SAMPLE_GPX.as_bytes()).unwrap();
        for track in &mut records {
            for segment in &mut track.segments {
                for record in segment.iter_mut() {
                    record.speed = None;
                }
            }
        }
        records[0].segments[0][2].speed = Some(7.0);

        merge_extension_speeds(&mut records, SAMPLE_GPX.as_bytes()).unwrap();

        let points = &records[0].segments[0];
        assert_eq!(points[0].speed, Some(2.5));
        assert_eq!(points[1].speed, Some(3.25));
        assert_eq!(points[2].speed, Some(7.0));
        assert_eq!(records[0].segments[1][1].speed, None);
    }

    #[test]
    fn test_extract_tracks_empty_input() {
        let tracks = extract_tracks(b"").unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_extract_tracks_malformed_xml() {
        let result = extract_tracks(b"<gpx><trk><trkseg></trk></gpx>");
        assert!(result.is_err());
    }
}
