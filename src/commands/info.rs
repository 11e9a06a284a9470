use super::{InputReader, load_tracks, read_input, track_label};
use crate::report::{
    NOT_AVAILABLE, format_distance, format_duration, format_optional_timestamp, format_speed,
};
use gpxstats::{BBox, DerivedPoint, DerivedTrack, EARTH_RADIUS, Track, parse_radius};
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;

pub fn info_command(
    file: Option<&Path>,
    radius: Option<&str>,
    reader: InputReader,
) -> Result<(), Box<dyn Error>> {
    let radius = radius.map(parse_radius).transpose()?.unwrap_or(EARTH_RADIUS);
    let input = read_input(file)?;
    let tracks = load_tracks(&input, reader)?;

    write_info(&tracks, radius, io::stdout().lock())
}

/// Writes the summary of every track. `radius` applies to the total distance.
pub fn write_info<W: Write>(
    tracks: &[Track],
    radius: f64,
    mut out: W,
) -> Result<(), Box<dyn Error>> {
    for (idx, track) in tracks.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        let derived = track.compute_averages();
        write_track_info(&derived, &track_label(track, idx), radius, &mut out)?;
    }

    Ok(())
}

fn write_track_info<W: Write>(
    track: &DerivedTrack,
    label: &str,
    radius: f64,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    let time_info = track.time_info();
    let total_dist = track.total_distance_with_radius(radius);
    let speed_info = track.speed_info();

    let (elapsed, total_avg) = match time_info.duration() {
        Some(duration) => (
            format_duration(duration),
            format_speed(total_dist / duration.as_seconds_f64()),
        ),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    writeln!(out, "Track:     {label}")?;
    writeln!(out, "Segments:  {}", track.segments().len())?;
    writeln!(out, "Points:    {}", track.total_points())?;
    writeln!(out, "Distance:  {}", format_distance(total_dist))?;
    writeln!(out, "Bounds:    {}", describe_bounds(track.bbox()))?;
    writeln!(out, "Start:     {}", format_optional_timestamp(time_info.start)?)?;
    writeln!(out, "End:       {}", format_optional_timestamp(time_info.end)?)?;
    writeln!(out, "Time:      {elapsed}")?;
    writeln!(out, "Total avg: {total_avg}")?;
    writeln!(out, "Moving:    {}", speed_info.moving)?;
    writeln!(out, "Still:     {}", speed_info.still)?;
    writeln!(out, "Min speed: {}", format_speed(speed_info.min.value))?;
    writeln!(out, "Max speed: {}", format_speed(speed_info.max.value))?;
    writeln!(out, "Avg speed: {}", moving_avg(speed_info.moving, speed_info.avg()))?;
    writeln!(out, "Min avg:   {}", format_speed(speed_info.avg_min.value))?;
    writeln!(out, "Max avg:   {}", format_speed(speed_info.avg_max.value))?;
    writeln!(out, "Avg avg:   {}", format_speed(speed_info.avg_avg()))?;
    writeln!(out, "First:     {}", describe_point(track.first_point())?)?;
    writeln!(out, "Last:      {}", describe_point(track.last_point())?)?;

    Ok(())
}

fn moving_avg(moving: usize, avg: f64) -> String {
    if moving == 0 {
        return NOT_AVAILABLE.to_string();
    }
    format_speed(avg)
}

fn describe_bounds(bbox: Option<BBox>) -> String {
    match bbox {
        Some(b) => format!(
            "{:.5}..{:.5}, {:.5}..{:.5}",
            b.lat_min, b.lat_max, b.lon_min, b.lon_max
        ),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn describe_point(point: Option<&DerivedPoint>) -> Result<String, Box<dyn Error>> {
    let Some(derived) = point else {
        return Ok(NOT_AVAILABLE.to_string());
    };
    let p = &derived.point;

    Ok(format!(
        "{:.5}, {:.5} at {}",
        p.lat,
        p.lon,
        format_optional_timestamp(p.time)?
    ))
}
