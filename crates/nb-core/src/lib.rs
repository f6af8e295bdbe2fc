pub mod document;
pub mod error;
pub mod hit;
pub mod model;
pub mod transform;

pub use document::{Document, Position, TransformRecord, read_document, write_document};
pub use error::{BoardError, Result};
pub use hit::hit_test;
pub use model::{EntryId, RenderHandle, Space, SpatialEntry, SpatialModel, placement_for};
pub use transform::Transform;

// Re-export kurbo geometry so downstream crates share one version.
pub use kurbo::{Affine, Point, Rect, Size, Vec2};
