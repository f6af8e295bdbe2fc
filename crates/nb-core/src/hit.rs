//! Hit testing: view-space point → child lookup.
//!
//! Walks children in reverse z-order (last painted = topmost) and returns the
//! first whose base-space rectangle contains the pointer. Child sizes belong
//! to the renderer, so the caller supplies them through `extent`.

use crate::model::{EntryId, SpatialModel};
use kurbo::{Point, Rect, Size};

/// Find the topmost child under a view-space point.
/// Returns `None` for the canvas background.
pub fn hit_test<P>(
    model: &SpatialModel<P>,
    view_point: Point,
    extent: impl Fn(EntryId) -> Option<Size>,
) -> Option<EntryId> {
    let base = model.transform().view_to_base(view_point);
    model
        .iter()
        .rev()
        .find(|entry| {
            extent(entry.id()).is_some_and(|size| {
                Rect::from_origin_size(entry.base_position(), size).contains(base)
            })
        })
        .map(|entry| entry.id())
}
