//! FeatureCollection - records sharing one extent, with a per-viewport transform cache
//!
//! A collection owns its records, the geographic extent they are drawn in and the options
//! of the transform pipeline. `screen_geometry` returns the transformed node arrays for a
//! viewport, recomputing them only when the viewport or the collection changed.

use crate::{
    CollectionKind, FeatureRecord, FieldSelection, GeographicExtent, Geometry, GeometryPart,
    ProjectionId, ScreenGeometry, TransformCache, TransformOptions, Viewport, Result,
    transform_records,
};
use geo::{BoundingRect, Centroid, Rect};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which record of a group of duplicates survives `dedupe`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DedupeKeep {
    #[default]
    First,
    Last,
}

/// Ordered feature records of one kind, drawn inside one geographic extent
#[derive(Clone, Debug)]
pub struct FeatureCollection {
    kind: CollectionKind,
    extent: GeographicExtent,
    projection: ProjectionId,
    records: Vec<FeatureRecord>,
    options: TransformOptions,
    cache: TransformCache,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl FeatureCollection {
    /// Create an empty collection in the extent's projection
    pub fn new(kind: CollectionKind, extent: GeographicExtent) -> Self {
        Self {
            kind,
            projection: extent.projection(),
            extent,
            records: Vec::new(),
            options: TransformOptions::default(),
            cache: TransformCache::Unbound,
        }
    }

    /// Builder form of [`FeatureCollection::set_projection`]
    pub fn with_projection(mut self, projection: ProjectionId) -> Self {
        self.set_projection(projection);
        self
    }

    /// Builder form of [`FeatureCollection::set_options`]
    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.set_options(options);
        self
    }

    #[inline]
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    #[inline]
    pub fn extent(&self) -> &GeographicExtent {
        &self.extent
    }

    #[inline]
    pub fn projection(&self) -> ProjectionId {
        self.projection
    }

    #[inline]
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    #[inline]
    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `screen_geometry(viewport)` would be served from the cache
    #[inline]
    pub fn is_cached(&self, viewport: Viewport) -> bool {
        self.cache.is_bound_to(viewport)
    }

    /// Set the projection the records are expressed in
    ///
    /// Features are never reprojected: a mismatch with the extent only logs a warning.
    pub fn set_projection(&mut self, projection: ProjectionId) {
        if projection != self.extent.projection() {
            tracing::warn!(
                "Projection mismatch: collection is {projection} but its extent is {}",
                self.extent.projection()
            );
        }
        self.projection = projection;
        self.cache.invalidate();
    }

    /// Replace the extent the collection is drawn in
    pub fn set_extent(&mut self, extent: GeographicExtent) {
        if extent.projection() != self.projection {
            tracing::warn!(
                "Projection mismatch: collection is {} but its extent is {}",
                self.projection,
                extent.projection()
            );
        }
        self.extent = extent;
        self.cache.invalidate();
    }

    pub fn set_options(&mut self, options: TransformOptions) {
        self.options = options;
        self.cache.invalidate();
    }

    pub fn set_local_tolerance(&mut self, tolerance: f64) {
        self.options.local_tolerance = tolerance;
        self.cache.invalidate();
    }

    pub fn set_global_tolerance(&mut self, tolerance: f64) {
        self.options.global_tolerance = tolerance;
        self.cache.invalidate();
    }

    pub fn set_label_field(&mut self, field: FieldSelection) {
        self.options.label = field;
        self.cache.invalidate();
    }

    pub fn set_value_field(&mut self, field: FieldSelection) {
        self.options.value = field;
        self.cache.invalidate();
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.options.debug = debug;
        self.cache.invalidate();
    }

    /// Append one record
    pub fn push(&mut self, record: FeatureRecord) {
        self.records.push(record);
        self.cache.invalidate();
    }

    /// Append records in order
    pub fn extend(&mut self, records: impl IntoIterator<Item = FeatureRecord>) {
        self.records.extend(records);
        self.cache.invalidate();
    }

    /// Transformed node arrays for `viewport`
    ///
    /// Repeated calls with the same viewport return the same `Arc` until the viewport or
    /// the collection changes. A degenerate extent is logged and yields an empty result
    /// bound to the viewport.
    pub fn screen_geometry(&mut self, viewport: Viewport) -> Arc<ScreenGeometry> {
        #[cfg(feature = "profiling")]
        profiling::scope!("collection::screen_geometry");

        self.cache.rebind_if_needed(viewport, |viewport| {
            transform_records(&self.records, self.kind, &self.extent, viewport, &self.options)
                .unwrap_or_else(|e| {
                    tracing::error!(
                        "Failed to transform {} records onto {}x{}: {e}",
                        self.records.len(),
                        viewport.width,
                        viewport.height
                    );
                    ScreenGeometry::empty(viewport)
                })
        })
    }

    /// Collapse point records that share a coordinate
    ///
    /// Records are keyed by the exact text of their first point. The surviving record of
    /// each group takes the position of the group's first occurrence. Records without a
    /// point are dropped. Returns the number of records removed.
    pub fn dedupe(&mut self, keep: DedupeKeep) -> usize {
        if self.kind != CollectionKind::Points {
            tracing::warn!("Deduplicating a {:?} collection by its point parts", self.kind);
        }

        let before = self.records.len();
        let mut groups: IndexMap<String, FeatureRecord> = IndexMap::with_capacity(before);
        for (index, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            let Some(key) = point_key(record.geometry()) else {
                tracing::warn!("Dropping record {index} without a point while deduplicating");
                continue;
            };
            match keep {
                DedupeKeep::First => {
                    groups.entry(key).or_insert(record);
                }
                DedupeKeep::Last => {
                    // Replacing a value keeps the key's original position
                    groups.insert(key, record);
                }
            }
        }

        self.records = groups.into_values().collect();
        self.cache.invalidate();
        let removed = before - self.records.len();
        tracing::debug!("Dedupe removed {removed} of {before} records");
        removed
    }

    /// A new collection with the records matching `predicate`
    pub fn filter(&self, predicate: impl Fn(&FeatureRecord) -> bool) -> Self {
        self.derive(self.kind, self.records.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// Records whose numeric `field` is at least `min`
    pub fn filter_by_value(&self, field: &str, min: f64) -> Self {
        self.filter(|record| {
            record
                .get(field)
                .and_then(|v| v.as_f64())
                .is_some_and(|v| v >= min)
        })
    }

    /// Records whose `field`, as text, equals one of `ids`
    ///
    /// Numbers compare by their text, so `"2"` selects an integer id of 2.
    pub fn filter_by_ids<S: AsRef<str>>(&self, field: &str, ids: &[S]) -> Self {
        self.filter(|record| {
            record.get(field).is_some_and(|v| {
                let text = v.to_string();
                ids.iter().any(|id| id.as_ref() == text)
            })
        })
    }

    /// Records whose `field` matches an SQL `LIKE` pattern (`%` any run, `_` any character)
    ///
    /// # Errors
    /// Returns [`crate::DataError::Pattern`] if the translated pattern does not compile.
    pub fn filter_by_pattern(&self, field: &str, pattern: &str) -> Result<Self> {
        let regex = like_to_regex(pattern)?;
        Ok(self.filter(|record| {
            record
                .get(field)
                .is_some_and(|v| regex.is_match(&v.to_string()))
        }))
    }

    /// Split into one collection per rounded numeric `field`, in order of first occurrence
    ///
    /// Records without a numeric `field` are left out.
    pub fn group_by_id(&self, field: &str) -> Vec<(i64, FeatureCollection)> {
        let mut groups: IndexMap<i64, Vec<FeatureRecord>> = IndexMap::new();
        for record in &self.records {
            match record.get(field).and_then(|v| v.as_f64()) {
                Some(id) => groups.entry(id.round() as i64).or_default().push(record.clone()),
                None => tracing::debug!("Record has no numeric {field:?}; not grouped"),
            }
        }
        groups
            .into_iter()
            .map(|(id, records)| (id, self.derive(self.kind, records)))
            .collect()
    }

    /// A point collection holding the centroid of every record, attributes kept
    pub fn centroids(&self) -> Self {
        let records = self
            .records
            .iter()
            .filter_map(|record| {
                let centroid = record.geometry().to_geo().centroid()?;
                Some(record.map_geometry(Geometry::Point(centroid)))
            })
            .collect();
        self.derive(CollectionKind::Points, records)
    }

    /// Bounding rectangle of every record, `None` when the collection has no coordinates
    pub fn bounds(&self) -> Option<Rect<f64>> {
        geo::GeometryCollection(self.records.iter().map(|r| r.geometry().to_geo()).collect())
            .bounding_rect()
    }

    /// Same extent, projection and options; fresh cache
    fn derive(&self, kind: CollectionKind, records: Vec<FeatureRecord>) -> Self {
        Self {
            kind,
            extent: self.extent,
            projection: self.projection,
            records,
            options: self.options.clone(),
            cache: TransformCache::Unbound,
        }
    }
}

fn point_key(geometry: &Geometry) -> Option<String> {
    geometry.parts().into_iter().find_map(|part| match part {
        GeometryPart::Point(p) => Some(format!("{} {}", p.x(), p.y())),
        _ => None,
    })
}

fn like_to_regex(pattern: &str) -> Result<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            c => translated.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    translated.push('$');
    Ok(Regex::new(&translated)?)
}
