//! Board sessions: one open note board and its persistence state.
//!
//! A `Board` owns the spatial model (notes + canvas transform), the drag
//! controller, and the text of the last save. It is the single mutation point
//! for a board: input events, collaborator calls, and loads all go through it.
//!
//! - **Input → model**: `handle_input` feeds events to the [`DragTool`],
//!   which emits `BoardMutation`s that `apply_mutation` executes.
//! - **Model → file**: `save` captures a [`Document`] and writes it;
//!   `is_dirty` compares a fresh serialization with the last saved text
//!   byte for byte.

use crate::config::BoardConfig;
use crate::input::InputEvent;
use crate::tools::{ContextTarget, DragState, DragTarget, DragTool};
use nb_core::{
    Affine, BoardError, Document, EntryId, Point, RenderHandle, Result, Size, Space,
    SpatialEntry, SpatialModel, Transform, hit_test, read_document, write_document,
};
use std::path::{Path, PathBuf};

/// An atomic change to a board, produced by the drag controller.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardMutation {
    /// Pan the canvas by a view-space delta.
    Pan { dx: f64, dy: f64 },
    /// Zoom the canvas about a view-space anchor.
    Zoom { origin: Point, factor: f64 },
    /// Move one note by a view-space delta.
    MoveNote { id: EntryId, dx: f64, dy: f64 },
}

#[derive(Debug)]
pub struct Board {
    model: SpatialModel<String>,
    tool: DragTool,
    config: BoardConfig,
    /// Serialization at the last save or load, or at creation for new boards.
    saved_text: Option<String>,
    path: Option<PathBuf>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with the identity transform.
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        let mut board = Self {
            model: SpatialModel::new(),
            tool: DragTool::new(config.wheel_zoom_step),
            config,
            saved_text: None,
            path: None,
        };
        // An untouched new board is not dirty.
        board.saved_text = board.serialize().ok();
        board
    }

    /// Load a board from a file.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `Parse` if it is not a board
    /// document, `InvalidTransform` if its stored scale is unusable.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_config(path, BoardConfig::default())
    }

    pub fn load_with_config(path: &Path, config: BoardConfig) -> Result<Self> {
        let document = read_document(path)?;
        let mut board = Self::from_document(document, config)?;
        board.path = Some(path.to_path_buf());
        log::debug!("loaded {} notes from {}", board.model.len(), path.display());
        Ok(board)
    }

    /// Build a board from an in-memory document. The document's own
    /// serialization becomes the clean baseline.
    pub fn from_document(document: Document, config: BoardConfig) -> Result<Self> {
        let model = document.into_model()?;
        let mut board = Self {
            model,
            tool: DragTool::new(config.wheel_zoom_step),
            config,
            saved_text: None,
            path: None,
        };
        board.saved_text = Some(board.serialize()?);
        Ok(board)
    }

    /// Write the board to `path`. On failure the board stays open and dirty.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let text = write_document(path, &self.document(), self.config.pretty)?;
        self.saved_text = Some(text);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Path of the last successful load or save.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    // ─── Persistence state ───────────────────────────────────────────────

    /// Snapshot the current board.
    pub fn document(&self) -> Document {
        Document::capture(&self.model)
    }

    fn serialize(&self) -> Result<String> {
        self.document().to_json(self.config.pretty)
    }

    /// Whether the board differs from its last save, by literal comparison of
    /// the serialized text.
    pub fn is_dirty(&self) -> bool {
        match self.serialize() {
            Ok(text) => self.saved_text.as_deref() != Some(text.as_str()),
            Err(_) => true,
        }
    }

    /// Whether the board's serialization equals a file's current content.
    pub fn matches_file(&self, path: &Path) -> Result<bool> {
        let on_disk = std::fs::read_to_string(path).map_err(|e| BoardError::io(path, e))?;
        Ok(self.serialize()? == on_disk)
    }

    // ─── Notes ───────────────────────────────────────────────────────────

    /// Add a note at a view-space position.
    ///
    /// # Errors
    /// `InvalidPosition` if the point maps to a non-finite base position.
    pub fn add_note(&mut self, text: impl Into<String>, view_pos: Point) -> Result<EntryId> {
        self.model.add_child(text.into(), view_pos, Space::View)
    }

    /// Add a note at a base-space position.
    pub fn add_note_at_base(
        &mut self,
        text: impl Into<String>,
        base_pos: Point,
    ) -> Result<EntryId> {
        self.model.add_child(text.into(), base_pos, Space::Base)
    }

    /// Remove a note. Unknown handles are a no-op returning `None`.
    ///
    /// The removed entry carries its render handle so the renderer can drop
    /// the matching visual.
    pub fn remove_note(&mut self, id: EntryId) -> Option<SpatialEntry<String>> {
        if let DragState::Dragging {
            target: DragTarget::Note(dragged),
            ..
        } = self.tool.state()
            && dragged == id
        {
            self.tool.cancel();
        }
        self.model.remove_child(id)
    }

    /// Move one note by a view-space delta. Returns `false` for an unknown
    /// handle, and `InvalidPosition` if the note would leave finite space.
    pub fn drag_note(&mut self, id: EntryId, dx: f64, dy: f64) -> Result<bool> {
        self.model.translate_child(id, dx, dy)
    }

    pub fn note_text(&self, id: EntryId) -> Option<&str> {
        self.model.get(id).map(|e| e.payload.as_str())
    }

    pub fn set_note_text(&mut self, id: EntryId, text: impl Into<String>) -> bool {
        match self.model.payload_mut(id) {
            Some(payload) => {
                *payload = text.into();
                true
            }
            None => false,
        }
    }

    /// Notes in z-order (first = bottom).
    pub fn notes(&self) -> impl Iterator<Item = &SpatialEntry<String>> {
        self.model.iter()
    }

    pub fn note_count(&self) -> usize {
        self.model.len()
    }

    /// Record the renderer's handle for a note's visual.
    pub fn register_render_handle(&mut self, id: EntryId, handle: RenderHandle) -> bool {
        self.model.set_render_handle(id, handle)
    }

    pub fn bring_to_front(&mut self, id: EntryId) -> bool {
        self.model.bring_to_front(id)
    }

    // ─── Canvas ──────────────────────────────────────────────────────────

    /// Pan the canvas by a view-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.model.pan(dx, dy)
    }

    /// Zoom about a view-space point.
    pub fn zoom(&mut self, view_pos: Point, factor: f64) -> Result<()> {
        self.model.zoom_at(factor, view_pos)
    }

    pub fn transform(&self) -> &Transform {
        self.model.transform()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.model.set_transform(transform);
    }

    /// Topmost note under a view-space point. `extent` reports each note's
    /// rendered size in base units.
    pub fn note_at(
        &self,
        view_pos: Point,
        extent: impl Fn(EntryId) -> Option<Size>,
    ) -> Option<EntryId> {
        hit_test(&self.model, view_pos, extent)
    }

    /// `(note, view-space affine)` for every note, bottom to top.
    pub fn placements(&self) -> Vec<(EntryId, Affine)> {
        self.model.placements().collect()
    }

    pub fn model(&self) -> &SpatialModel<String> {
        &self.model
    }

    // ─── Interaction ─────────────────────────────────────────────────────

    /// Feed an input event through the drag controller and apply the
    /// resulting mutations. `hit` is the note under the pointer, if any.
    ///
    /// Returns `true` if the board changed.
    pub fn handle_input(&mut self, event: &InputEvent, hit: Option<EntryId>) -> Result<bool> {
        let mutations = self.tool.handle(event, hit);
        let changed = !mutations.is_empty();
        for mutation in mutations {
            self.apply_mutation(mutation)?;
        }
        Ok(changed)
    }

    pub fn apply_mutation(&mut self, mutation: BoardMutation) -> Result<()> {
        log::trace!("apply {mutation:?}");
        match mutation {
            BoardMutation::Pan { dx, dy } => self.model.pan(dx, dy),
            BoardMutation::Zoom { origin, factor } => self.model.zoom_at(factor, origin),
            BoardMutation::MoveNote { id, dx, dy } => {
                if !self.model.translate_child(id, dx, dy)? {
                    log::debug!("move ignored: note {id} no longer exists");
                }
                Ok(())
            }
        }
    }

    pub fn tool(&self) -> &DragTool {
        &self.tool
    }

    /// Target and position of the last context menu.
    pub fn context(&self) -> Option<ContextTarget> {
        self.tool.context()
    }

    /// Add a note where the last context menu was opened, consuming it.
    /// Returns `None` if no context menu is pending.
    pub fn add_note_at_context(&mut self, text: impl Into<String>) -> Result<Option<EntryId>> {
        let Some(ctx) = self.tool.context() else {
            return Ok(None);
        };
        let id = self.add_note(text, ctx.position)?;
        self.tool.clear_context();
        Ok(Some(id))
    }

    /// Remove the note the last context menu was opened on, consuming it.
    pub fn remove_context_note(&mut self) -> Option<SpatialEntry<String>> {
        let ctx = self.tool.context()?;
        self.tool.clear_context();
        match ctx.target {
            DragTarget::Note(id) => self.remove_note(id),
            DragTarget::Canvas => None,
        }
    }
}

/// Load several board files independently. One failure never prevents the
/// others from loading; each path gets its own result.
pub fn load_boards<P: AsRef<Path>>(
    paths: &[P],
    config: &BoardConfig,
) -> Vec<(PathBuf, Result<Board>)> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref().to_path_buf();
            let result = Board::load_with_config(&path, config.clone());
            if let Err(err) = &result {
                log::warn!("failed to load {}: {err}", path.display());
            }
            (path, result)
        })
        .collect()
}
