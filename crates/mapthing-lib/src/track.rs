//! GPS tracks: samples grouped into segments, with distance and elevation analytics
//!
//! A [`Track`] is built append-only from samples (usually converted from GPX) and is then
//! only read. Distances are great-circle distances on a sphere with the WGS84 equatorial
//! radius, computed with the spherical law of cosines.

use crate::{CollectionKind, FeatureRecord, Result};
use geo::{Coord, LineString, Point};
use std::fmt;
use std::io::Read;
use std::path::Path;
use time::OffsetDateTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sphere radius used for track distances, in meters
pub const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// One GPS fix
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSample {
    pub time: Option<OffsetDateTime>,
    /// x = longitude, y = latitude, in degrees
    pub coord: Option<Coord<f64>>,
    /// Meters, 0 when the source has none
    pub elevation: f64,
    pub name: String,
}

impl TrackSample {
    pub fn new(coord: Coord<f64>) -> Self {
        Self {
            coord: Some(coord),
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time: OffsetDateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Great-circle distance in meters, 0 if either sample has no coordinate
    pub fn distance_to(&self, other: &TrackSample) -> f64 {
        let (Some(a), Some(b)) = (self.coord, other.coord) else {
            return 0.0;
        };
        if a == b {
            return 0.0;
        }

        let lat1 = a.y.to_radians();
        let lat2 = b.y.to_radians();
        let delta_lon = (b.x - a.x).to_radians();

        let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * delta_lon.cos();
        // Rounding can push nearly coincident points just past 1
        cos_angle.clamp(-1.0, 1.0).acos() * EARTH_EQUATORIAL_RADIUS_M
    }
}

impl From<&gpx::Waypoint> for TrackSample {
    fn from(waypoint: &gpx::Waypoint) -> Self {
        let point = waypoint.point();
        Self {
            time: waypoint.time.clone().map(OffsetDateTime::from),
            coord: Some(point.0),
            elevation: waypoint.elevation.unwrap_or(0.0),
            name: waypoint.name.clone().unwrap_or_default(),
        }
    }
}

/// An uninterrupted run of samples
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSegment {
    samples: Vec<TrackSample>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackSegment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: TrackSample) {
        self.samples.push(sample);
    }

    #[inline]
    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sum of distances between consecutive samples, in meters
    pub fn length(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    /// Sum of elevation gains between consecutive samples, unsmoothed
    pub fn cumulative_ascent(&self) -> f64 {
        self.elevation_deltas().filter(|d| *d > 0.0).sum()
    }

    /// Sum of elevation losses between consecutive samples, as a positive number
    pub fn cumulative_descent(&self) -> f64 {
        self.elevation_deltas()
            .filter(|d| *d < 0.0)
            .map(f64::abs)
            .sum()
    }

    /// Earliest timestamp among the samples that have one
    pub fn start_time(&self) -> Option<OffsetDateTime> {
        self.samples.iter().filter_map(|s| s.time).min()
    }

    /// Latest timestamp among the samples that have one
    pub fn end_time(&self) -> Option<OffsetDateTime> {
        self.samples.iter().filter_map(|s| s.time).max()
    }

    fn elevation_deltas(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .windows(2)
            .map(|pair| pair[1].elevation - pair[0].elevation)
    }
}

impl From<&gpx::TrackSegment> for TrackSegment {
    fn from(segment: &gpx::TrackSegment) -> Self {
        Self {
            samples: segment.points.iter().map(TrackSample::from).collect(),
        }
    }
}

/// Ordered segments of one recording
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    name: Option<String>,
    segments: Vec<TrackSegment>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn push(&mut self, segment: TrackSegment) {
        self.segments.push(segment);
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    /// Total number of samples across all segments
    pub fn sample_count(&self) -> usize {
        self.segments.iter().map(TrackSegment::len).sum()
    }

    /// Length in meters; gaps between segments are not counted
    pub fn length(&self) -> f64 {
        self.segments.iter().map(TrackSegment::length).sum()
    }

    pub fn cumulative_ascent(&self) -> f64 {
        self.segments.iter().map(TrackSegment::cumulative_ascent).sum()
    }

    pub fn cumulative_descent(&self) -> f64 {
        self.segments.iter().map(TrackSegment::cumulative_descent).sum()
    }

    pub fn start_time(&self) -> Option<OffsetDateTime> {
        self.segments.iter().filter_map(TrackSegment::start_time).min()
    }

    pub fn end_time(&self) -> Option<OffsetDateTime> {
        self.segments.iter().filter_map(TrackSegment::end_time).max()
    }

    /// All statistics at once, for reporting
    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            name: self.name.clone().unwrap_or_default(),
            length_m: self.length(),
            ascent_m: self.cumulative_ascent(),
            descent_m: self.cumulative_descent(),
            start: self.start_time(),
            end: self.end_time(),
            samples: self.sample_count(),
        }
    }
}

impl From<&gpx::Track> for Track {
    fn from(track: &gpx::Track) -> Self {
        Self {
            name: track.name.clone(),
            segments: track.segments.iter().map(TrackSegment::from).collect(),
        }
    }
}

/// Scalar statistics of a track
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSummary {
    pub name: String,
    pub length_m: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
    pub samples: usize,
}

impl fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() {
            "(unnamed)"
        } else {
            &self.name
        };
        write!(
            f,
            "{name}: {} samples, {:.1} km, +{:.0} m / -{:.0} m",
            self.samples,
            self.length_m / 1000.0,
            self.ascent_m,
            self.descent_m
        )?;
        if let (Some(start), Some(end)) = (self.start, self.end) {
            write!(f, ", {start} to {end}")?;
        }
        Ok(())
    }
}

/// Parse every track of a GPX document
pub fn read_gpx<R: Read>(reader: R) -> Result<Vec<Track>> {
    let gpx = gpx::read(reader)?;
    Ok(gpx.tracks.iter().map(Track::from).collect())
}

/// Parse every track of a GPX file
pub fn read_gpx_file(path: impl AsRef<Path>) -> Result<Vec<Track>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("track::read_gpx_file");

    let file = std::fs::File::open(path.as_ref())?;
    let tracks = read_gpx(std::io::BufReader::new(file))?;
    tracing::debug!(
        "Read {} tracks from {}",
        tracks.len(),
        path.as_ref().display()
    );
    Ok(tracks)
}

/// Feature records for drawing a track
///
/// `Points` gives one record per located sample with `name`, `elevation` and `segment`
/// attributes. `Lines` gives one two-vertex line per consecutive located pair with `name`
/// (of the first sample), `distance` and `climb` attributes. Tracks have no polygons.
pub fn track_records(track: &Track, kind: CollectionKind) -> Vec<FeatureRecord> {
    let mut records = Vec::new();
    match kind {
        CollectionKind::Points => {
            for (segment_index, segment) in track.segments().iter().enumerate() {
                for sample in segment.samples() {
                    let Some(coord) = sample.coord else { continue };
                    records.push(
                        FeatureRecord::new(Point(coord))
                            .attribute("name", sample.name.as_str())
                            .attribute("elevation", sample.elevation)
                            .attribute("segment", segment_index as i64),
                    );
                }
            }
        }
        CollectionKind::Lines => {
            for segment in track.segments() {
                for pair in segment.samples().windows(2) {
                    let (Some(from), Some(to)) = (pair[0].coord, pair[1].coord) else {
                        continue;
                    };
                    records.push(
                        FeatureRecord::new(LineString::new(vec![from, to]))
                            .attribute("name", pair[0].name.as_str())
                            .attribute("distance", pair[0].distance_to(&pair[1]))
                            .attribute("climb", pair[1].elevation - pair[0].elevation),
                    );
                }
            }
        }
        CollectionKind::Polygons => {
            tracing::warn!("Tracks have no polygon geometry");
        }
    }
    records
}
