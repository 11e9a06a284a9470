pub mod info;
pub mod points;

use crate::gpxxml::{extract_tracks, merge_extension_speeds};
use clap::ValueEnum;
use gpxstats::{Track, TrackRecords};
use gpxstats::ingest::tracks_from_gpx;
use log::debug;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Which parser turns the document into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputReader {
    /// Streaming `quick-xml` reader, tolerant of speed extensions
    Stream,
    /// Full document parse with the `gpx` crate
    Gpx,
}

/// Reads the whole input from `file`, or from stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> Result<Vec<u8>, Box<dyn Error>> {
    match file {
        Some(path) => fs::read(path).map_err(|e| format!("{}: {e}", path.display()).into()),
        None => {
            let mut input = Vec::new();
            io::stdin().lock().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}

/// Parses `input` into records with the chosen reader.
pub fn load_records(
    input: &[u8],
    reader: InputReader,
) -> Result<Vec<TrackRecords>, Box<dyn Error>> {
    let records = match reader {
        InputReader::Stream => extract_tracks(input)?,
        InputReader::Gpx => {
            let mut records = tracks_from_gpx(&gpx::read(input)?);
            merge_extension_speeds(&mut records, input)?;
            records
        }
    };

    if records.is_empty() {
        return Err("No tracks found in input".into());
    }

    Ok(records)
}

pub fn load_tracks(input: &[u8], reader: InputReader) -> Result<Vec<Track>, Box<dyn Error>> {
    let records = load_records(input, reader)?;
    let tracks: Vec<Track> = records.iter().map(Track::from_record_segments).collect();
    debug!(
        "loaded {} track(s), {} point(s)",
        tracks.len(),
        tracks.iter().map(Track::total_points).sum::<usize>()
    );

    Ok(tracks)
}

/// Display label for the track at `idx`.
pub fn track_label<P>(track: &Track<P>, idx: usize) -> String {
    match &track.name {
        Some(name) => name.clone(),
        None => format!("Track {}", idx + 1),
    }
}
