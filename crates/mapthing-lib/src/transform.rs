//! Transformation of feature records into screen-space node arrays

use crate::{
    CollectionKind, DataError, FeatureRecord, FieldSelection, GeographicExtent, Geometry,
    GeometryPart, Link, Node, Result, Viewport, project,
    simplify::{polygon_outline, simplify_global, simplify_local},
};
use geo::Coord;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration of the transform pipeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransformOptions {
    /// Douglas-Peucker tolerance applied to each chain or ring, in source units.
    /// 0 disables local simplification.
    pub local_tolerance: f64,
    /// Topology-preserving tolerance applied to each whole record geometry before parts are
    /// extracted, as an area in squared source units. 0 disables global simplification.
    pub global_tolerance: f64,
    /// Where to find each feature's label
    pub label: FieldSelection,
    /// Where to find each feature's value
    pub value: FieldSelection,
    /// Emit per-vertex and dropped-hole diagnostics
    pub debug: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            local_tolerance: 0.0,
            global_tolerance: 0.0,
            label: FieldSelection::label(),
            value: FieldSelection::value(),
            debug: false,
        }
    }
}

/// Screen-space result of transforming a collection for one viewport
///
/// Each part is one independent node array: a single node for a point, a chain for a line,
/// an outline for a polygon. The geographic coordinates the nodes were projected from are
/// kept alongside, part for part.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenGeometry {
    viewport: Viewport,
    parts: Vec<Vec<Node>>,
    raw_parts: Vec<Vec<Coord<f64>>>,
}

impl ScreenGeometry {
    pub fn new(viewport: Viewport, parts: Vec<Vec<Node>>, raw_parts: Vec<Vec<Coord<f64>>>) -> Self {
        Self {
            viewport,
            parts,
            raw_parts,
        }
    }

    /// A result with no parts
    pub fn empty(viewport: Viewport) -> Self {
        Self::new(viewport, Vec::new(), Vec::new())
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Node arrays, one per emitted part
    #[inline]
    pub fn parts(&self) -> &[Vec<Node>] {
        &self.parts
    }

    /// Geographic coordinates (after simplification), one array per emitted part
    #[inline]
    pub fn raw_parts(&self) -> &[Vec<Coord<f64>>] {
        &self.raw_parts
    }

    /// All nodes of all parts, in order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.parts.iter().flatten()
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Links between consecutive nodes of every part
    pub fn links(&self) -> Vec<Link<'_>> {
        let mut links = Vec::new();
        for part in &self.parts {
            let first_id = links.len() as u64;
            links.extend(
                Link::chain(part)
                    .into_iter()
                    .map(|link| Link {
                        id: first_id + link.id,
                        ..link
                    }),
            );
        }
        links
    }

    /// A copy with every part reversed and the part order reversed
    pub fn reversed(&self) -> Self {
        Self {
            viewport: self.viewport,
            parts: reverse_parts(&self.parts),
            raw_parts: reverse_parts(&self.raw_parts),
        }
    }
}

fn reverse_parts<T: Clone>(parts: &[Vec<T>]) -> Vec<Vec<T>> {
    parts
        .iter()
        .rev()
        .map(|part| part.iter().rev().cloned().collect())
        .collect()
}

/// Project every record onto `viewport`, which is assumed to cover `extent` exactly
///
/// Screen x is `project(x, west, east, 0, width)` and screen y is
/// `project(y, north, south, 0, height)`. Parts whose kind does not match `kind` and
/// vertices with non-finite coordinates are skipped with a diagnostic; the rest of the
/// collection is still transformed.
///
/// # Errors
/// Returns [`DataError::DegenerateRange`] if the extent has zero width or height.
pub fn transform_records(
    records: &[FeatureRecord],
    kind: CollectionKind,
    extent: &GeographicExtent,
    viewport: Viewport,
    options: &TransformOptions,
) -> Result<ScreenGeometry> {
    #[cfg(feature = "profiling")]
    profiling::scope!("transform::transform_records");

    if extent.west() == extent.east() {
        return Err(DataError::DegenerateRange {
            min: extent.west(),
            max: extent.east(),
        });
    }
    if extent.north() == extent.south() {
        return Err(DataError::DegenerateRange {
            min: extent.north(),
            max: extent.south(),
        });
    }

    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);
    let label_selector = options.label.selector();
    let value_selector = options.value.selector();

    let mut parts = Vec::new();
    let mut raw_parts = Vec::new();

    for (record_index, record) in records.iter().enumerate() {
        let geometry: Cow<'_, Geometry> = if options.global_tolerance > 0.0 {
            Cow::Owned(simplify_global(record.geometry(), options.global_tolerance))
        } else {
            Cow::Borrowed(record.geometry())
        };

        let label = label_selector.resolve_label(record.attributes());
        let value = value_selector.resolve_value(record.attributes());

        for part in geometry.parts() {
            let chain = match (kind, part) {
                (CollectionKind::Points, GeometryPart::Point(p)) => vec![p.0],
                (CollectionKind::Lines, GeometryPart::LineString(ls)) => {
                    simplify_local(ls, options.local_tolerance).0
                }
                (CollectionKind::Polygons, GeometryPart::Polygon(p)) => {
                    polygon_outline(p, options.local_tolerance, options.debug).0
                }
                (_, other) => {
                    tracing::warn!(
                        "Skipping {:?} geometry in record {record_index} of a {kind:?} collection",
                        other.kind()
                    );
                    continue;
                }
            };

            let mut nodes = Vec::with_capacity(chain.len());
            let mut raw = Vec::with_capacity(chain.len());
            for coord in chain {
                if !coord.x.is_finite() || !coord.y.is_finite() {
                    tracing::warn!(
                        "Skipping vertex with missing coordinate ({}, {}) in record {record_index}",
                        coord.x,
                        coord.y
                    );
                    continue;
                }

                let x = project(coord.x, extent.west(), extent.east(), 0.0, width);
                let y = project(coord.y, extent.north(), extent.south(), 0.0, height);
                if options.debug {
                    tracing::trace!(
                        "({}, {}) mapped from ({}..{}, {}..{}) onto {width}x{height} as ({x}, {y})",
                        coord.x,
                        coord.y,
                        extent.west(),
                        extent.east(),
                        extent.north(),
                        extent.south()
                    );
                }

                let mut node = Node::new(Node::id_for(coord), x, y);
                node.value = value;
                node.label = label.clone();
                nodes.push(node);
                raw.push(coord);
            }

            if nodes.is_empty() {
                continue;
            }
            parts.push(nodes);
            raw_parts.push(raw);
        }
    }

    Ok(ScreenGeometry::new(viewport, parts, raw_parts))
}
