//! Screen-space primitives handed to a renderer

use geo::Coord;
use std::hash::{DefaultHasher, Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A screen-space vertex with identity, optional depth, value and label
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    /// Identifier derived from the source coordinate (not guaranteed unique)
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub value: Option<f64>,
    pub label: Option<String>,
}

impl Node {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            z: None,
            value: None,
            label: None,
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Value for rendering, 0 when absent
    #[inline]
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    /// Label for rendering, empty when absent
    #[inline]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Screen position as a coordinate
    #[inline]
    pub fn position(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// Identifier for a node created from the given source coordinate
    ///
    /// Equal coordinates give equal identifiers; distinct coordinates may collide.
    pub fn id_for(coord: Coord<f64>) -> u64 {
        let mut hasher = DefaultHasher::new();
        coord.x.to_bits().hash(&mut hasher);
        coord.y.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}

/// An edge between two nodes that it borrows
#[derive(Clone, Debug, PartialEq)]
pub struct Link<'a> {
    pub id: u64,
    pub from: &'a Node,
    pub to: &'a Node,
    pub weight: Option<f64>,
    pub label: Option<String>,
}

impl<'a> Link<'a> {
    pub fn new(id: u64, from: &'a Node, to: &'a Node) -> Self {
        Self {
            id,
            from,
            to,
            weight: None,
            label: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Screen-space length of the edge
    #[inline]
    pub fn length(&self) -> f64 {
        (self.to.x - self.from.x).hypot(self.to.y - self.from.y)
    }

    /// Links between consecutive nodes of a chain
    pub fn chain(nodes: &'a [Node]) -> Vec<Link<'a>> {
        nodes
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Link::new(i as u64, &pair[0], &pair[1]))
            .collect()
    }
}

/// Diameter of a proportional symbol
///
/// The circle's area is `value / max` times the area of a circle of `radius`, so symbol
/// area rather than diameter tracks the value. Values above `max` keep growing. The result
/// is rounded to whole pixels.
pub fn area_scaled_diameter(value: f64, max: f64, radius: f64) -> f64 {
    let max_area = std::f64::consts::PI * radius.powi(2);
    let area = (value / max) * max_area;
    (area / std::f64::consts::PI).sqrt().round()
}
