//! MapThing Library - Geographic to Screen Projection
//!
//! This library maps geographic features (points, lines, polygons and GPS tracks) onto a
//! rectangular pixel viewport for rendering, optionally reducing their vertex count first,
//! and computes the distance and elevation statistics used for track summaries.
//!
//! # Architecture
//!
//! - **[`project`]**: Linear remap of a scalar between two ranges, used for both axes
//! - **[`GeographicExtent`]**: Geographic window and its placement inside a parent window
//! - **[`simplify`]**: Local (Douglas-Peucker) and global (topology preserving) reduction
//! - **[`FeatureCollection`]**: Records sharing an extent, with a per-viewport transform cache
//! - **[`Track`]**: Hierarchical GPS recording with distance and ascent/descent analytics
//! - **[`Node`] / [`Link`]**: Screen-space primitives consumed by a renderer
//!
//! # Data Flow
//!
//! raw geometry + attributes -> simplifier -> projector (via extent) -> transform cache ->
//! node arrays -> external renderer

mod attribute;
mod cache;
mod collection;
pub mod columns;
mod extent;
mod feature;
mod node;
mod projector;
pub mod simplify;
mod track;
mod transform;

// Public API exports
pub use attribute::{AttributeValue, Attributes, FieldSelection, FieldSelector};
pub use cache::{TransformCache, Viewport};
pub use collection::{DedupeKeep, FeatureCollection};
pub use extent::{GeographicExtent, MIN_FRAME_SPAN, ProjectionId, ScreenPlacement};
pub use feature::{CollectionKind, FeatureRecord, Geometry, GeometryPart};
pub use node::{Link, Node, area_scaled_diameter};
pub use projector::{project, try_project};
pub use track::{
    EARTH_EQUATORIAL_RADIUS_M, Track, TrackSample, TrackSegment, TrackSummary, read_gpx,
    read_gpx_file, track_records,
};
pub use transform::{ScreenGeometry, TransformOptions, transform_records};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Degenerate range: cannot map from [{min}, {max}]")]
    DegenerateRange { min: f64, max: f64 },

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Missing coordinate columns: {0}")]
    MissingColumns(String),

    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;
