//! Canvas transform: the affine map between base space and view space.
//!
//! A board stores every note in **base space**. Pointer events and the
//! renderer live in **view space**. The two are related by a translate + scale
//! map (no rotation, no shear):
//!
//! ```text
//! view = base * scale + offset
//! ```
//!
//! The inverse map is needed on every pointer event (hit testing, dragging,
//! adding a note under the cursor), so it is memoized and only rebuilt after
//! the forward transform changes.

use crate::error::{BoardError, Result};
use kurbo::{Affine, Point, Vec2};
use std::cell::Cell;

/// Translate + scale transform from base space to view space.
///
/// Invariant: both scale factors are strictly positive and finite, and the
/// offset is finite. Every constructor and mutator checks this and leaves the
/// transform untouched on failure.
#[derive(Debug, Clone)]
pub struct Transform {
    offset_x: f64,
    offset_y: f64,
    scale_x: f64,
    scale_y: f64,
    /// Cached view → base map. `None` after any forward change.
    inverse: Cell<Option<Affine>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.offset_x == other.offset_x
            && self.offset_y == other.offset_y
            && self.scale_x == other.scale_x
            && self.scale_y == other.scale_y
    }
}

impl Transform {
    /// The identity transform: base space and view space coincide.
    pub fn identity() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            inverse: Cell::new(None),
        }
    }

    /// Build a transform from its four components.
    ///
    /// # Errors
    /// `InvalidTransform` if a scale is zero, negative, or non-finite, or an
    /// offset is non-finite.
    pub fn new(offset_x: f64, offset_y: f64, scale_x: f64, scale_y: f64) -> Result<Self> {
        validate(offset_x, offset_y, scale_x, scale_y)?;
        Ok(Self {
            offset_x,
            offset_y,
            scale_x,
            scale_y,
            inverse: Cell::new(None),
        })
    }

    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    /// Offset as a vector (view-space position of the base origin).
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset_x, self.offset_y)
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Pan by a view-space delta.
    ///
    /// The delta is appended after the scale, so the content follows the
    /// pointer one-to-one regardless of zoom.
    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.commit(
            self.offset_x + dx,
            self.offset_y + dy,
            self.scale_x,
            self.scale_y,
        )
    }

    /// Scale uniformly by `factor` about a fixed view-space point.
    ///
    /// The base-space point under `origin` stays under `origin`:
    /// `offset' = origin + (offset - origin) * factor`.
    pub fn scale_at(&mut self, factor: f64, origin: Point) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(BoardError::InvalidTransform {
                offset_x: self.offset_x,
                offset_y: self.offset_y,
                scale_x: self.scale_x * factor,
                scale_y: self.scale_y * factor,
            });
        }
        if factor == 1.0 {
            return Ok(());
        }
        self.commit(
            origin.x + (self.offset_x - origin.x) * factor,
            origin.y + (self.offset_y - origin.y) * factor,
            self.scale_x * factor,
            self.scale_y * factor,
        )
    }

    fn commit(&mut self, offset_x: f64, offset_y: f64, scale_x: f64, scale_y: f64) -> Result<()> {
        validate(offset_x, offset_y, scale_x, scale_y)?;
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.inverse.set(None);
        Ok(())
    }

    // ─── Mapping ─────────────────────────────────────────────────────────

    /// The base → view map as an affine matrix.
    pub fn to_affine(&self) -> Affine {
        Affine::new([
            self.scale_x,
            0.0,
            0.0,
            self.scale_y,
            self.offset_x,
            self.offset_y,
        ])
    }

    /// The view → base map, rebuilt only if the transform changed since the
    /// last request.
    pub fn inverse_affine(&self) -> Affine {
        if let Some(cached) = self.inverse.get() {
            return cached;
        }
        let inverse = Affine::new([
            1.0 / self.scale_x,
            0.0,
            0.0,
            1.0 / self.scale_y,
            -self.offset_x / self.scale_x,
            -self.offset_y / self.scale_y,
        ]);
        self.inverse.set(Some(inverse));
        inverse
    }

    /// Map a base-space point to view space.
    pub fn base_to_view(&self, point: Point) -> Point {
        self.to_affine() * point
    }

    /// Map a view-space point to base space.
    pub fn view_to_base(&self, point: Point) -> Point {
        self.inverse_affine() * point
    }

    /// Rescale a view-space vector (e.g. a drag delta) into base-space units.
    ///
    /// Only the linear part of the inverse applies; translation cancels out.
    pub fn view_to_base_vector(&self, vector: Vec2) -> Vec2 {
        self.view_to_base(Point::ORIGIN + vector) - self.view_to_base(Point::ORIGIN)
    }

    #[cfg(test)]
    fn inverse_is_cached(&self) -> bool {
        self.inverse.get().is_some()
    }
}

fn validate(offset_x: f64, offset_y: f64, scale_x: f64, scale_y: f64) -> Result<()> {
    let scales_ok = scale_x.is_finite() && scale_y.is_finite() && scale_x > 0.0 && scale_y > 0.0;
    if scales_ok && offset_x.is_finite() && offset_y.is_finite() {
        Ok(())
    } else {
        Err(BoardError::InvalidTransform {
            offset_x,
            offset_y,
            scale_x,
            scale_y,
        })
    }
}
