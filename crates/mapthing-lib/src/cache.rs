//! Per-collection cache of screen-space geometry
//!
//! The cache is a two-state machine: `Unbound` until the first request, then
//! `Bound { viewport, data }`. A request for the bound viewport returns the cached data; any
//! other viewport rebuilds everything from scratch. There is no incremental diffing.

use crate::ScreenGeometry;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel dimensions of the drawing surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Cached transform result of one feature collection
#[derive(Clone, Debug, Default)]
pub enum TransformCache {
    #[default]
    Unbound,
    Bound {
        viewport: Viewport,
        data: Arc<ScreenGeometry>,
    },
}

impl TransformCache {
    /// Whether a request for `viewport` would be served from the cache
    #[inline]
    pub fn is_bound_to(&self, viewport: Viewport) -> bool {
        matches!(self, TransformCache::Bound { viewport: bound, .. } if *bound == viewport)
    }

    /// The bound viewport, if any
    pub fn viewport(&self) -> Option<Viewport> {
        match self {
            TransformCache::Unbound => None,
            TransformCache::Bound { viewport, .. } => Some(*viewport),
        }
    }

    /// Return the cached geometry for `viewport`, rebuilding it with `build` if the cache
    /// is unbound or bound to a different viewport
    pub fn rebind_if_needed<F>(&mut self, viewport: Viewport, build: F) -> Arc<ScreenGeometry>
    where
        F: FnOnce(Viewport) -> ScreenGeometry,
    {
        if let TransformCache::Bound {
            viewport: bound,
            data,
        } = self
        {
            if *bound == viewport {
                return Arc::clone(data);
            }
            tracing::debug!(
                "Viewport changed from {}x{} to {}x{}; retransforming",
                bound.width,
                bound.height,
                viewport.width,
                viewport.height
            );
        }

        let data = Arc::new(build(viewport));
        *self = TransformCache::Bound {
            viewport,
            data: Arc::clone(&data),
        };
        data
    }

    /// Drop the cached data
    pub fn invalidate(&mut self) {
        *self = TransformCache::Unbound;
    }
}
