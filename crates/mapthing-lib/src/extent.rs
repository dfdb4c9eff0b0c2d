//! Geographic extents and their placement on screen
//!
//! An extent is the rectangular geographic window that is stretched over the pixel
//! viewport. Extents can be nested: a child extent bound to a parent extent learns where
//! its own rectangle falls inside the parent's pixel rectangle.

use crate::{Result, Viewport, projector::try_project};
use geo::{Coord, Rect};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side of the square [`GeographicExtent::framing`] puts around a single coordinate
pub const MIN_FRAME_SPAN: f64 = 0.001;

/// Integer code of a coordinate reference system (an EPSG SRID)
///
/// The code is only compared, never used to reproject: every extent and feature in a
/// pipeline is assumed to share one projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectionId(pub u32);

impl ProjectionId {
    /// WGS84 geographic coordinates (EPSG:4326)
    pub const WGS84: ProjectionId = ProjectionId(4326);
    /// British National Grid (EPSG:27700)
    pub const OSGB: ProjectionId = ProjectionId(27700);
}

impl Default for ProjectionId {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for ProjectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Where an extent's rectangle lands inside a parent's pixel rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenPlacement {
    /// Left edge in pixels
    pub offset_x: f64,
    /// Top edge in pixels
    pub offset_y: f64,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

/// A rectangular geographic window (north, east, south, west) in one projection
///
/// North is expected to be greater than south. There is no dateline handling: east and
/// west are used as given.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeographicExtent {
    north: f64,
    east: f64,
    south: f64,
    west: f64,
    projection: ProjectionId,
    /// Cached result of the last `bind_to_viewport` call
    #[cfg_attr(feature = "serde", serde(skip))]
    placement: Option<ScreenPlacement>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl GeographicExtent {
    /// Create an extent in WGS84
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Self {
        Self::with_projection(ProjectionId::WGS84, north, east, south, west)
    }

    /// Create an extent in an explicit projection
    pub fn with_projection(
        projection: ProjectionId,
        north: f64,
        east: f64,
        south: f64,
        west: f64,
    ) -> Self {
        Self {
            north,
            east,
            south,
            west,
            projection,
            placement: None,
        }
    }

    /// Create an extent covering a `geo::Rect` (x = easting, y = northing)
    pub fn from_rect(rect: Rect<f64>, projection: ProjectionId) -> Self {
        Self::with_projection(
            projection,
            rect.max().y,
            rect.max().x,
            rect.min().y,
            rect.min().x,
        )
    }

    /// Create an extent framing `rect` that is never degenerate
    ///
    /// A flat axis is widened around its centre to the other axis's span, and a single
    /// coordinate gets a square of side [`MIN_FRAME_SPAN`].
    pub fn framing(rect: Rect<f64>, projection: ProjectionId) -> Self {
        let (width, height) = (rect.width(), rect.height());
        let span = if width > 0.0 {
            width
        } else if height > 0.0 {
            height
        } else {
            MIN_FRAME_SPAN
        };
        let pad_x = if width > 0.0 { 0.0 } else { span / 2.0 };
        let pad_y = if height > 0.0 { 0.0 } else { span / 2.0 };

        Self::with_projection(
            projection,
            rect.max().y + pad_y,
            rect.max().x + pad_x,
            rect.min().y - pad_y,
            rect.min().x - pad_x,
        )
    }

    /// Convert to a `geo::Rect`
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    #[inline]
    pub fn north(&self) -> f64 {
        self.north
    }

    #[inline]
    pub fn east(&self) -> f64 {
        self.east
    }

    #[inline]
    pub fn south(&self) -> f64 {
        self.south
    }

    #[inline]
    pub fn west(&self) -> f64 {
        self.west
    }

    #[inline]
    pub fn projection(&self) -> ProjectionId {
        self.projection
    }

    /// Change the projection identifier (no reprojection takes place)
    pub fn set_projection(&mut self, projection: ProjectionId) {
        self.projection = projection;
    }

    /// Place this extent inside the pixel rectangle of `parent`
    ///
    /// Each offset is exactly zero when the corresponding edge (west, north) coincides with
    /// the parent's edge. Width and height are the projected positions of the opposite
    /// edges (east, south) minus the offsets, so asymmetric nesting maps correctly.
    ///
    /// The placement is recomputed on every call and cached until the next one. Binding to
    /// a parent with a different projection only logs a warning.
    ///
    /// # Errors
    /// Returns [`crate::DataError::DegenerateRange`] if the parent has zero width or height;
    /// the previously cached placement is kept in that case.
    pub fn bind_to_viewport(
        &mut self,
        parent: &GeographicExtent,
        width: u32,
        height: u32,
    ) -> Result<ScreenPlacement> {
        if parent.projection != self.projection {
            tracing::warn!(
                "Projection mismatch: extent is {} but parent is {}; output may be misaligned",
                self.projection,
                parent.projection
            );
        }

        let width = f64::from(width);
        let height = f64::from(height);

        let offset_x = if self.west == parent.west {
            0.0
        } else {
            try_project(self.west, parent.west, parent.east, 0.0, width)?
        };
        let offset_y = if self.north == parent.north {
            0.0
        } else {
            try_project(self.north, parent.north, parent.south, 0.0, height)?
        };

        let placement = ScreenPlacement {
            offset_x,
            offset_y,
            width: try_project(self.east, parent.west, parent.east, 0.0, width)? - offset_x,
            height: try_project(self.south, parent.north, parent.south, 0.0, height)? - offset_y,
        };

        self.placement = Some(placement);
        Ok(placement)
    }

    /// The placement computed by the last successful `bind_to_viewport` call
    #[inline]
    pub fn placement(&self) -> Option<ScreenPlacement> {
        self.placement
    }

    /// Width in pixels that keeps this extent's aspect ratio for the given height
    pub fn width_from_height(&self, height: u32) -> u32 {
        let lat_span = self.north - self.south;
        let lon_span = self.west - self.east;
        (f64::from(height) * (lon_span / lat_span)).abs() as u32
    }

    /// Height in pixels that keeps this extent's aspect ratio for the given width
    pub fn height_from_width(&self, width: u32) -> u32 {
        let lat_span = self.north - self.south;
        let lon_span = self.west - self.east;
        (f64::from(width) * (lat_span / lon_span)).abs() as u32
    }

    /// Map a geographic coordinate onto a viewport covering exactly this extent
    ///
    /// Screen y grows downwards, so north maps to row 0 and south to `viewport.height`.
    #[inline]
    pub fn to_screen(&self, coord: Coord<f64>, viewport: Viewport) -> Result<Coord<f64>> {
        Ok(Coord {
            x: try_project(coord.x, self.west, self.east, 0.0, f64::from(viewport.width))?,
            y: try_project(coord.y, self.north, self.south, 0.0, f64::from(viewport.height))?,
        })
    }

    /// Compare all four edges within `margin`, ignoring the projection
    pub fn approx_eq(&self, other: &GeographicExtent, margin: f64) -> bool {
        (self.north - other.north).abs() <= margin
            && (self.east - other.east).abs() <= margin
            && (self.south - other.south).abs() <= margin
            && (self.west - other.west).abs() <= margin
    }
}

impl PartialEq for GeographicExtent {
    /// Extents are equal when their edges and projection match; the cached placement is
    /// not part of the identity.
    fn eq(&self, other: &Self) -> bool {
        self.north == other.north
            && self.east == other.east
            && self.south == other.south
            && self.west == other.west
            && self.projection == other.projection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_extent() -> GeographicExtent {
        GeographicExtent::new(10.0, 10.0, 0.0, 0.0)
    }

    #[test]
    fn test_to_screen_corners_and_center() {
        let extent = unit_extent();
        let viewport = Viewport::new(100, 100);

        let center = extent.to_screen(Coord { x: 5.0, y: 5.0 }, viewport).unwrap();
        assert_abs_diff_eq!(center.x, 50.0);
        assert_abs_diff_eq!(center.y, 50.0);

        // (west, north) is the top-left corner
        let top_left = extent.to_screen(Coord { x: 0.0, y: 10.0 }, viewport).unwrap();
        assert_abs_diff_eq!(top_left.x, 0.0);
        assert_abs_diff_eq!(top_left.y, 0.0);

        // (east, south) is the bottom-right corner
        let bottom_right = extent.to_screen(Coord { x: 10.0, y: 0.0 }, viewport).unwrap();
        assert_abs_diff_eq!(bottom_right.x, 100.0);
        assert_abs_diff_eq!(bottom_right.y, 100.0);
    }

    #[test]
    fn test_to_screen_degenerate_extent() {
        let extent = GeographicExtent::new(5.0, 10.0, 5.0, 0.0);
        let result = extent.to_screen(Coord { x: 1.0, y: 5.0 }, Viewport::new(10, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_same_extent_fills_viewport() {
        let parent = unit_extent();
        let mut child = unit_extent();

        let placement = child.bind_to_viewport(&parent, 200, 100).unwrap();
        assert_eq!(placement.offset_x, 0.0);
        assert_eq!(placement.offset_y, 0.0);
        assert_abs_diff_eq!(placement.width, 200.0);
        assert_abs_diff_eq!(placement.height, 100.0);
        assert_eq!(child.placement(), Some(placement));
    }

    #[test]
    fn test_bind_nested_asymmetric_extent() {
        let parent = unit_extent();
        // Upper-right quadrant, not touching the parent's west or north edge
        let mut child = GeographicExtent::new(8.0, 9.0, 6.0, 5.0);

        let placement = child.bind_to_viewport(&parent, 100, 100).unwrap();
        assert_abs_diff_eq!(placement.offset_x, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.offset_y, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.width, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(placement.height, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bind_is_idempotent() {
        let parent = GeographicExtent::new(51.7, 0.3, 51.3, -0.5);
        let mut child = GeographicExtent::new(51.6, 0.1, 51.4, -0.2);

        let first = child.bind_to_viewport(&parent, 1024, 768).unwrap();
        let second = child.bind_to_viewport(&parent, 1024, 768).unwrap();
        assert_eq!(first, second);
        assert_eq!(child.placement(), Some(second));
    }

    #[test]
    fn test_bind_projection_mismatch_is_not_fatal() {
        let parent = GeographicExtent::with_projection(ProjectionId::OSGB, 10.0, 10.0, 0.0, 0.0);
        let mut child = unit_extent();
        assert!(child.bind_to_viewport(&parent, 100, 100).is_ok());
    }

    #[test]
    fn test_bind_degenerate_parent_keeps_previous_placement() {
        let parent = unit_extent();
        let mut child = GeographicExtent::new(8.0, 9.0, 6.0, 5.0);
        let placement = child.bind_to_viewport(&parent, 100, 100).unwrap();

        let flat = GeographicExtent::new(10.0, 0.0, 0.0, 0.0);
        assert!(child.bind_to_viewport(&flat, 100, 100).is_err());
        assert_eq!(child.placement(), Some(placement));
    }

    #[test]
    fn test_aspect_ratio_helpers() {
        // Twice as wide as tall
        let extent = GeographicExtent::new(10.0, 20.0, 0.0, 0.0);
        assert_eq!(extent.width_from_height(100), 200);
        assert_eq!(extent.height_from_width(100), 50);

        // Truncation, not rounding
        let extent = GeographicExtent::new(3.0, 10.0, 0.0, 0.0);
        assert_eq!(extent.height_from_width(100), 30);
        assert_eq!(extent.width_from_height(10), 33);
    }

    #[test]
    fn test_equality_ignores_placement() {
        let parent = unit_extent();
        let mut bound = unit_extent();
        bound.bind_to_viewport(&parent, 10, 10).unwrap();
        assert_eq!(bound, unit_extent());

        let other = GeographicExtent::with_projection(ProjectionId::OSGB, 10.0, 10.0, 0.0, 0.0);
        assert_ne!(other, unit_extent());
        assert!(other.approx_eq(&unit_extent(), 0.0));
    }

    #[test]
    fn test_approx_eq_margin() {
        let a = unit_extent();
        let b = GeographicExtent::new(10.05, 9.98, 0.01, -0.02);
        assert!(a.approx_eq(&b, 0.1));
        assert!(!a.approx_eq(&b, 0.03));
    }

    #[test]
    fn test_rect_roundtrip() {
        let extent = GeographicExtent::new(51.6, 0.1, 51.4, -0.2);
        let rect = extent.to_rect();
        assert_eq!(GeographicExtent::from_rect(rect, ProjectionId::WGS84), extent);
    }

    #[test]
    fn test_framing_widens_flat_axes() {
        // Already a proper rectangle
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 4.0, y: 2.0 });
        assert_eq!(
            GeographicExtent::framing(rect, ProjectionId::WGS84),
            GeographicExtent::from_rect(rect, ProjectionId::WGS84)
        );

        // A line along a meridian becomes a square around it
        let meridian = Rect::new(Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 5.0 });
        let extent = GeographicExtent::framing(meridian, ProjectionId::WGS84);
        assert_eq!(extent, GeographicExtent::new(5.0, 3.5, 0.0, -1.5));
        assert_eq!(extent.height_from_width(1024), 1024);

        // A single point
        let point = Rect::new(Coord { x: 5.0, y: 5.0 }, Coord { x: 5.0, y: 5.0 });
        let extent = GeographicExtent::framing(point, ProjectionId::OSGB);
        assert_abs_diff_eq!(extent.north() - extent.south(), MIN_FRAME_SPAN, epsilon = 1e-12);
        assert_abs_diff_eq!(extent.east() - extent.west(), MIN_FRAME_SPAN, epsilon = 1e-12);
        assert_eq!(extent.projection(), ProjectionId::OSGB);
        let center = extent.to_screen(Coord { x: 5.0, y: 5.0 }, Viewport::new(100, 100)).unwrap();
        assert_abs_diff_eq!(center.x, 50.0, epsilon = 1e-6);
        assert_abs_diff_eq!(center.y, 50.0, epsilon = 1e-6);
    }

    #[test]
    fn test_projection_display() {
        assert_eq!(ProjectionId::OSGB.to_string(), "EPSG:27700");
        assert_eq!(ProjectionId::default(), ProjectionId::WGS84);
    }
}
