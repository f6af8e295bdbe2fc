//! Persisted board documents.
//!
//! A board file is one JSON object:
//!
//! ```json
//! {
//!   "Transform": { "OffsetX": 0.0, "OffsetY": 0.0, "ScaleX": 1.0, "ScaleY": 1.0 },
//!   "Texts": ["first note", "second note"],
//!   "Positions": [{ "X": 10.0, "Y": 20.0 }, { "X": 200.0, "Y": 40.0 }]
//! }
//! ```
//!
//! `Texts[i]` pairs with `Positions[i]`. The lists may differ in length in
//! files written elsewhere; loading keeps the shorter length and drops the
//! tail of the longer list. Unknown fields are ignored.
//!
//! Older boards store the transform as a full 2x3 matrix
//! (`M11`, `M12`, `M21`, `M22`, `OffsetX`, `OffsetY`) with no `ScaleX` or
//! `ScaleY`. Those load too: `M11` and `M22` stand in for the missing scales
//! and the shear terms are ignored, since boards never rotate. Saving always
//! writes the `ScaleX`/`ScaleY` layout.

use crate::error::{BoardError, Result};
use crate::model::{SpatialModel, Space, check_position};
use crate::transform::Transform;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ─── Wire types ──────────────────────────────────────────────────────────

/// Transform as it appears on disk. Not validated until it is turned into a
/// [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "StoredTransform")]
pub struct TransformRecord {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Every transform field a board file may carry, in either layout.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoredTransform {
    offset_x: f64,
    offset_y: f64,
    scale_x: Option<f64>,
    scale_y: Option<f64>,
    #[serde(rename = "M11")]
    m11: Option<f64>,
    #[serde(rename = "M22")]
    m22: Option<f64>,
}

impl TryFrom<StoredTransform> for TransformRecord {
    type Error = String;

    fn try_from(t: StoredTransform) -> std::result::Result<Self, String> {
        let scale_x = t.scale_x.or(t.m11).ok_or("missing field `ScaleX` (or `M11`)")?;
        let scale_y = t.scale_y.or(t.m22).ok_or("missing field `ScaleY` (or `M22`)")?;
        Ok(Self {
            offset_x: t.offset_x,
            offset_y: t.offset_y,
            scale_x,
            scale_y,
        })
    }
}

impl Default for TransformRecord {
    fn default() -> Self {
        Self::from(&Transform::identity())
    }
}

impl From<&Transform> for TransformRecord {
    fn from(t: &Transform) -> Self {
        Self {
            offset_x: t.offset_x(),
            offset_y: t.offset_y(),
            scale_x: t.scale_x(),
            scale_y: t.scale_y(),
        }
    }
}

impl TryFrom<TransformRecord> for Transform {
    type Error = BoardError;

    fn try_from(r: TransformRecord) -> Result<Self> {
        Transform::new(r.offset_x, r.offset_y, r.scale_x, r.scale_y)
    }
}

/// A note position in base space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Position> for Point {
    fn from(p: Position) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Snapshot of a board: transform plus ordered note texts and positions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "Transform", default)]
    pub transform: TransformRecord,
    #[serde(rename = "Texts", default)]
    pub texts: Vec<String>,
    #[serde(rename = "Positions", default)]
    pub positions: Vec<Position>,
}

// ─── Capture / replay ────────────────────────────────────────────────────

impl Document {
    /// Snapshot a model: entries in z-order, base positions, current transform.
    pub fn capture<P: AsRef<str>>(model: &SpatialModel<P>) -> Self {
        let (texts, positions) = model
            .iter()
            .map(|e| (e.payload.as_ref().to_string(), Position::from(e.base_position())))
            .unzip();
        Self {
            transform: TransformRecord::from(model.transform()),
            texts,
            positions,
        }
    }

    /// Number of notes this document yields on load.
    pub fn note_count(&self) -> usize {
        self.texts.len().min(self.positions.len())
    }

    /// Split into a validated transform and the ordered `(text, position)`
    /// pairs, truncated to the shorter of the two lists.
    ///
    /// # Errors
    /// `InvalidTransform` if the stored scale is zero, negative, or
    /// non-finite.
    pub fn into_notes(self) -> Result<(Transform, Vec<(String, Point)>)> {
        let transform = Transform::try_from(self.transform)?;
        if self.texts.len() != self.positions.len() {
            log::debug!(
                "document has {} texts and {} positions; keeping {}",
                self.texts.len(),
                self.positions.len(),
                self.note_count()
            );
        }
        let notes = self
            .texts
            .into_iter()
            .zip(self.positions)
            .map(|(text, pos)| (text, Point::from(pos)))
            .collect();
        Ok((transform, notes))
    }

    /// Replay into a fresh model, preserving order.
    pub fn into_model(self) -> Result<SpatialModel<String>> {
        let (transform, notes) = self.into_notes()?;
        let mut model = SpatialModel::with_transform(transform);
        for (text, pos) in notes {
            model.add_child(text, pos, Space::Base)?;
        }
        Ok(model)
    }

    // ─── JSON ────────────────────────────────────────────────────────────

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to JSON. Float formatting is shortest round-trip, so equal
    /// documents always produce identical bytes.
    ///
    /// # Errors
    /// `InvalidPosition` for a NaN or infinite position, which JSON would
    /// store as `null` and fail to load back.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        for pos in &self.positions {
            check_position(Point::from(*pos))?;
        }
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

// ─── Files ───────────────────────────────────────────────────────────────

/// Read and parse a board file.
pub fn read_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path).map_err(|e| BoardError::io(path, e))?;
    Document::from_json(&text)
}

/// Serialize and write a board file, returning the exact text written.
pub fn write_document(path: &Path, document: &Document, pretty: bool) -> Result<String> {
    let text = document.to_json(pretty)?;
    std::fs::write(path, &text).map_err(|e| BoardError::io(path, e))?;
    log::debug!("wrote {} notes to {}", document.note_count(), path.display());
    Ok(text)
}
