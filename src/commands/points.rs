use super::{InputReader, load_tracks, read_input, track_label};
use crate::report::{
    NOT_AVAILABLE, format_distance, format_optional_timestamp, format_seconds, format_speed,
};
use gpxstats::{DerivedPoint, Track};
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;

pub fn points_command(file: Option<&Path>, reader: InputReader) -> Result<(), Box<dyn Error>> {
    let input = read_input(file)?;
    let tracks = load_tracks(&input, reader)?;

    write_points(&tracks, io::stdout().lock())
}

/// Writes one table row per point, grouped by track and segment.
pub fn write_points<W: Write>(tracks: &[Track], mut out: W) -> Result<(), Box<dyn Error>> {
    for (idx, track) in tracks.iter().enumerate() {
        writeln!(out, "# {}", track_label(track, idx))?;

        let derived = track.compute_averages();
        for (seg_idx, segment) in derived.segments().iter().enumerate() {
            writeln!(out, "## Segment {} ({} points)", seg_idx + 1, segment.len())?;
            writeln!(
                out,
                "{:>5}  {:<19}  {:>10}  {:>11}  {:>8}  {:>6}  {:>11}  {:>11}",
                "#", "time", "lat", "lon", "dist", "dtime", "avg speed", "speed"
            )?;
            for (pt_idx, point) in segment.points().iter().enumerate() {
                write_row(pt_idx, point, &mut out)?;
            }
        }
    }

    Ok(())
}

fn write_row<W: Write>(
    idx: usize,
    derived: &DerivedPoint,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let p = &derived.point;
    let speed = match p.speed {
        Some(speed) => format_speed(speed),
        None => NOT_AVAILABLE.to_string(),
    };

    writeln!(
        out,
        "{:>5}  {:<19}  {:>10.5}  {:>11.5}  {:>8}  {:>6}  {:>11}  {:>11}",
        idx,
        format_optional_timestamp(p.time)?,
        p.lat,
        p.lon,
        format_distance(derived.dist),
        format_seconds(derived.dtime),
        format_speed(derived.avg_speed),
        speed
    )?;

    Ok(())
}
