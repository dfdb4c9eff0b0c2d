//! Feature records: a geometry plus ordered attributes

use crate::{AttributeValue, Attributes, DataError};
use geo::{LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of geometry a collection renders
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollectionKind {
    Points,
    Lines,
    Polygons,
}

/// Geometry of a feature record
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Point<f64>),
    MultiPoint(MultiPoint<f64>),
    LineString(LineString<f64>),
    MultiLineString(MultiLineString<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Collection(Vec<Geometry>),
}

/// One single-part piece of a [`Geometry`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryPart<'a> {
    Point(&'a Point<f64>),
    LineString(&'a LineString<f64>),
    Polygon(&'a Polygon<f64>),
}

impl GeometryPart<'_> {
    /// The collection kind this part belongs to
    #[inline]
    pub fn kind(&self) -> CollectionKind {
        match self {
            GeometryPart::Point(_) => CollectionKind::Points,
            GeometryPart::LineString(_) => CollectionKind::Lines,
            GeometryPart::Polygon(_) => CollectionKind::Polygons,
        }
    }
}

impl Geometry {
    /// Decompose into single-part pieces, in order
    pub fn parts(&self) -> Vec<GeometryPart<'_>> {
        let mut parts = Vec::new();
        self.collect_parts(&mut parts);
        parts
    }

    fn collect_parts<'a>(&'a self, parts: &mut Vec<GeometryPart<'a>>) {
        match self {
            Geometry::Point(p) => parts.push(GeometryPart::Point(p)),
            Geometry::MultiPoint(mp) => parts.extend(mp.0.iter().map(GeometryPart::Point)),
            Geometry::LineString(ls) => parts.push(GeometryPart::LineString(ls)),
            Geometry::MultiLineString(mls) => {
                parts.extend(mls.0.iter().map(GeometryPart::LineString))
            }
            Geometry::Polygon(p) => parts.push(GeometryPart::Polygon(p)),
            Geometry::MultiPolygon(mp) => parts.extend(mp.0.iter().map(GeometryPart::Polygon)),
            Geometry::Collection(geometries) => {
                for geometry in geometries {
                    geometry.collect_parts(parts);
                }
            }
        }
    }

    /// Number of single-part pieces
    pub fn num_parts(&self) -> usize {
        match self {
            Geometry::Point(_) | Geometry::LineString(_) | Geometry::Polygon(_) => 1,
            Geometry::MultiPoint(mp) => mp.0.len(),
            Geometry::MultiLineString(mls) => mls.0.len(),
            Geometry::MultiPolygon(mp) => mp.0.len(),
            Geometry::Collection(geometries) => geometries.iter().map(Geometry::num_parts).sum(),
        }
    }

    /// The kind of the geometry, or `None` for a collection
    pub fn kind(&self) -> Option<CollectionKind> {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(CollectionKind::Points),
            Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(CollectionKind::Lines),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Some(CollectionKind::Polygons),
            Geometry::Collection(_) => None,
        }
    }

    /// Convert to the equivalent `geo::Geometry`
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Geometry::Point(p) => geo::Geometry::Point(*p),
            Geometry::MultiPoint(mp) => geo::Geometry::MultiPoint(mp.clone()),
            Geometry::LineString(ls) => geo::Geometry::LineString(ls.clone()),
            Geometry::MultiLineString(mls) => geo::Geometry::MultiLineString(mls.clone()),
            Geometry::Polygon(p) => geo::Geometry::Polygon(p.clone()),
            Geometry::MultiPolygon(mp) => geo::Geometry::MultiPolygon(mp.clone()),
            Geometry::Collection(geometries) => geo::Geometry::GeometryCollection(
                geo::GeometryCollection(geometries.iter().map(Geometry::to_geo).collect()),
            ),
        }
    }
}

impl From<Point<f64>> for Geometry {
    fn from(value: Point<f64>) -> Self {
        Geometry::Point(value)
    }
}

impl From<LineString<f64>> for Geometry {
    fn from(value: LineString<f64>) -> Self {
        Geometry::LineString(value)
    }
}

impl From<Polygon<f64>> for Geometry {
    fn from(value: Polygon<f64>) -> Self {
        Geometry::Polygon(value)
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(value: MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon(value)
    }
}

impl From<MultiLineString<f64>> for Geometry {
    fn from(value: MultiLineString<f64>) -> Self {
        Geometry::MultiLineString(value)
    }
}

impl From<geo::Geometry<f64>> for Geometry {
    /// Lines become two-vertex line strings, rectangles and triangles become polygons
    fn from(value: geo::Geometry<f64>) -> Self {
        match value {
            geo::Geometry::Point(p) => Geometry::Point(p),
            geo::Geometry::MultiPoint(mp) => Geometry::MultiPoint(mp),
            geo::Geometry::Line(line) => {
                Geometry::LineString(LineString::new(vec![line.start, line.end]))
            }
            geo::Geometry::LineString(ls) => Geometry::LineString(ls),
            geo::Geometry::MultiLineString(mls) => Geometry::MultiLineString(mls),
            geo::Geometry::Polygon(p) => Geometry::Polygon(p),
            geo::Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp),
            geo::Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()),
            geo::Geometry::Triangle(triangle) => Geometry::Polygon(triangle.to_polygon()),
            geo::Geometry::GeometryCollection(gc) => {
                Geometry::Collection(gc.0.into_iter().map(Geometry::from).collect())
            }
        }
    }
}

/// A geometry with its attributes, immutable once built
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    geometry: Geometry,
    attributes: Attributes,
}

impl FeatureRecord {
    /// Create a record without attributes
    pub fn new(geometry: impl Into<Geometry>) -> Self {
        Self {
            geometry: geometry.into(),
            attributes: Attributes::new(),
        }
    }

    /// Create a record with an attribute table
    pub fn with_attributes(geometry: impl Into<Geometry>, attributes: Attributes) -> Self {
        Self {
            geometry: geometry.into(),
            attributes,
        }
    }

    /// Builder-style attribute insertion, used while a record is being assembled
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up an attribute by name
    #[inline]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Replace the geometry, keeping the attributes (used to derive new records)
    pub(crate) fn map_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            attributes: self.attributes.clone(),
        }
    }
}

impl TryFrom<(geo::Geometry<f64>, Attributes)> for FeatureRecord {
    type Error = DataError;

    /// Build a record from parsed geometry, rejecting empty collections
    fn try_from((geometry, attributes): (geo::Geometry<f64>, Attributes)) -> Result<Self, DataError> {
        let geometry = Geometry::from(geometry);
        if geometry.num_parts() == 0 {
            return Err(DataError::InvalidGeometry(
                "Geometry has no parts".to_string(),
            ));
        }
        Ok(Self::with_attributes(geometry, attributes))
    }
}
