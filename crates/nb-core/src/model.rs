//! Spatial model: an ordered collection of positioned children under one
//! canvas transform.
//!
//! Children are stored in base space. Each child caches its **placement**, the
//! view-space affine at which a renderer should draw it:
//!
//! ```text
//! placement = transform * translate(base_position)
//! ```
//!
//! The per-child offset is applied before the canvas transform, so panning
//! and zooming move every child uniformly. Insertion order is z-order
//! (last = topmost) and survives save/load.

use crate::error::{BoardError, Result};
use crate::transform::Transform;
use kurbo::{Affine, Point, Vec2};
use std::fmt;

/// Stable handle to one child. Identity is the handle, never the value:
/// two children with equal payload and position are still distinct.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque token issued by an external renderer for the visual it created
/// for a child. Stored alongside the child so the two can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Which coordinate space a supplied position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Already in stored (base) coordinates.
    Base,
    /// Pointer/screen coordinates; converted through the inverse transform.
    View,
}

/// One child: payload + base-space position + cached placement.
#[derive(Debug, Clone)]
pub struct SpatialEntry<P> {
    id: EntryId,
    pub payload: P,
    base_position: Point,
    placement: Affine,
    render_handle: Option<RenderHandle>,
}

impl<P> SpatialEntry<P> {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn base_position(&self) -> Point {
        self.base_position
    }

    /// View-space affine to render this child at.
    pub fn placement(&self) -> Affine {
        self.placement
    }

    pub fn render_handle(&self) -> Option<RenderHandle> {
        self.render_handle
    }

    fn update_placement(&mut self, transform: &Transform) {
        self.placement = placement_for(transform, self.base_position);
    }
}

/// Compose a child's base-space offset with the canvas transform.
pub fn placement_for(transform: &Transform, base_position: Point) -> Affine {
    transform.to_affine() * Affine::translate(base_position.to_vec2())
}

/// Reject positions that would serialize as `null`.
pub(crate) fn check_position(p: Point) -> Result<()> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(())
    } else {
        Err(BoardError::InvalidPosition { x: p.x, y: p.y })
    }
}

/// Ordered children plus the canvas transform that places them.
#[derive(Debug, Clone)]
pub struct SpatialModel<P> {
    entries: Vec<SpatialEntry<P>>,
    transform: Transform,
    next_id: u64,
}

impl<P> Default for SpatialModel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SpatialModel<P> {
    pub fn new() -> Self {
        Self::with_transform(Transform::identity())
    }

    pub fn with_transform(transform: Transform) -> Self {
        Self {
            entries: Vec::new(),
            transform,
            next_id: 0,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Children in z-order (first = bottom).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SpatialEntry<P>> {
        self.entries.iter()
    }

    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: EntryId) -> Option<&SpatialEntry<P>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Mutable access to a child's payload. Position and placement stay
    /// under the model's control.
    pub fn payload_mut(&mut self, id: EntryId) -> Option<&mut P> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.payload)
    }

    // ─── Children ────────────────────────────────────────────────────────

    /// Append a child at `position` and return its handle.
    ///
    /// # Errors
    /// `InvalidPosition` if the base-space position is not finite. A finite
    /// view point can still overflow through a very small scale.
    pub fn add_child(&mut self, payload: P, position: Point, space: Space) -> Result<EntryId> {
        let base_position = match space {
            Space::Base => position,
            Space::View => self.transform.view_to_base(position),
        };
        check_position(base_position)?;
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(SpatialEntry {
            id,
            payload,
            base_position,
            placement: placement_for(&self.transform, base_position),
            render_handle: None,
        });
        log::debug!("added child {id} at base ({}, {})", base_position.x, base_position.y);
        Ok(id)
    }

    /// Remove a child by handle, returning it (render handle included).
    ///
    /// Unknown handles are a no-op and return `None`.
    pub fn remove_child(&mut self, id: EntryId) -> Option<SpatialEntry<P>> {
        match self.index_of(id) {
            Some(idx) => {
                log::debug!("removed child {id} (z-index {idx})");
                Some(self.entries.remove(idx))
            }
            None => {
                log::debug!("remove_child: no child {id}");
                None
            }
        }
    }

    /// Move one child by a view-space delta.
    ///
    /// The delta is rescaled by the inverse transform's linear part, so the
    /// child tracks the pointer at any zoom. Returns `false` for an unknown
    /// handle.
    ///
    /// # Errors
    /// `InvalidPosition` if the moved position would not be finite; the
    /// child stays where it was.
    pub fn translate_child(&mut self, id: EntryId, dx: f64, dy: f64) -> Result<bool> {
        let delta = self.transform.view_to_base_vector(Vec2::new(dx, dy));
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        let moved = entry.base_position + delta;
        check_position(moved)?;
        entry.base_position = moved;
        entry.update_placement(&self.transform);
        log::trace!("moved child {id} by base ({}, {})", delta.x, delta.y);
        Ok(true)
    }

    /// Attach the renderer's handle for a child's visual.
    pub fn set_render_handle(&mut self, id: EntryId, handle: RenderHandle) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.render_handle = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Move a child to the top of the z-order.
    pub fn bring_to_front(&mut self, id: EntryId) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                let entry = self.entries.remove(idx);
                self.entries.push(entry);
                true
            }
            None => false,
        }
    }

    // ─── Transform ───────────────────────────────────────────────────────

    /// Replace the canvas transform and re-place every child.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.update_placements();
    }

    /// Pan the whole canvas by a view-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.transform.translate(dx, dy)?;
        self.update_placements();
        Ok(())
    }

    /// Zoom the whole canvas about a view-space anchor.
    pub fn zoom_at(&mut self, factor: f64, origin: Point) -> Result<()> {
        self.transform.scale_at(factor, origin)?;
        self.update_placements();
        Ok(())
    }

    fn update_placements(&mut self) {
        for entry in &mut self.entries {
            entry.update_placement(&self.transform);
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn placement_of(&self, id: EntryId) -> Option<Affine> {
        self.get(id).map(SpatialEntry::placement)
    }

    /// `(handle, placement)` for every child, bottom to top.
    pub fn placements(&self) -> impl Iterator<Item = (EntryId, Affine)> + '_ {
        self.entries.iter().map(|e| (e.id, e.placement))
    }
}
