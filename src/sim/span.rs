//! Horizontal extent of a block
//!
//! Blocks only ever move along x, so overlap between two layers is a 1-D
//! interval problem:
//! - center: x of the block's midpoint
//! - width: full extent (left = center - width/2, right = center + width/2)

use serde::{Deserialize, Serialize};

/// A block's footprint along the x axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub center: f32,
    pub width: f32,
}

impl Span {
    pub fn new(center: f32, width: f32) -> Self {
        Self { center, width }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center + self.width / 2.0
    }

    /// Signed offset of `other` relative to this span's center
    #[inline]
    pub fn delta_to(&self, other: &Span) -> f32 {
        other.center - self.center
    }

    /// Length shared with a span of the same width offset by `delta`.
    ///
    /// Zero or negative means the two do not touch.
    #[inline]
    pub fn overlap_at(&self, delta: f32) -> f32 {
        self.width - delta.abs()
    }

    /// The shared region when `other` (same width as `self`) lands on this span.
    /// `None` if they do not overlap.
    pub fn intersect(&self, other: &Span) -> Option<Span> {
        let delta = self.delta_to(other);
        let overlap = self.overlap_at(delta);
        if overlap <= 0.0 {
            return None;
        }
        Some(Span::new(other.center - delta / 2.0, overlap))
    }
}
