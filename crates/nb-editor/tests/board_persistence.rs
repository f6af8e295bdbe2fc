//! Integration tests: board sessions ↔ board files (nb-editor + nb-core).
//!
//! Covers save → load round-trips, truncation of mismatched files, per-file
//! isolation in batch loads, and dirty tracking across saves.

use nb_core::{BoardError, Point, RenderHandle, Size, Vec2};
use nb_editor::{Board, BoardConfig, InputEvent, load_boards};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

const NOTE_SIZE: Size = Size::new(80.0, 40.0);

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn notes_of(board: &Board) -> Vec<(String, Point)> {
    board
        .notes()
        .map(|e| (e.payload.clone(), e.base_position()))
        .collect()
}

// ─── Round-trip ─────────────────────────────────────────────────────────

#[test]
fn hello_survives_zoom_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.json");

    let mut board = Board::new();
    let id = board.add_note("Hello", Point::new(50.0, 50.0)).unwrap();
    let base_before = board.model().get(id).unwrap().base_position();
    board.zoom(Point::new(50.0, 50.0), 2.0).unwrap();
    board.save(&path).unwrap();

    let reloaded = Board::load(&path).unwrap();
    assert_eq!(notes_of(&reloaded), vec![("Hello".to_string(), base_before)]);
    assert_eq!(reloaded.transform(), board.transform());
    assert_eq!(reloaded.transform().scale_x(), 2.0);
}

#[test]
fn roundtrip_preserves_order_positions_and_transform() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let mut board = Board::new();
    board.add_note_at_base("first", Point::new(-3.5, 8.0)).unwrap();
    board.add_note_at_base("second", Point::new(1e-3, 123456.789)).unwrap();
    board.add_note_at_base("first", Point::new(-3.5, 8.0)).unwrap();
    board.pan(17.0, -4.25).unwrap();
    board.zoom(Point::new(320.0, 240.0), 1.1).unwrap();
    board.save(&path).unwrap();

    let reloaded = Board::load(&path).unwrap();
    assert_eq!(notes_of(&reloaded), notes_of(&board));
    assert_eq!(reloaded.transform(), board.transform());
    assert!(!reloaded.is_dirty());
}

#[test]
fn fixture_loads_with_transform_and_placements() {
    let board = Board::load(&fixture("two_notes.json")).unwrap();
    assert_eq!(
        notes_of(&board),
        vec![
            ("Buy milk".to_string(), Point::new(10.0, 20.0)),
            ("Call the plumber".to_string(), Point::new(300.25, -75.0)),
        ]
    );

    let placements = board.placements();
    assert_eq!(placements.len(), 2);
    // (10, 20) * 1.5 + (-120, 40.5)
    assert_eq!(placements[0].1.translation(), Vec2::new(-105.0, 70.5));
}

// ─── Normalization & errors ─────────────────────────────────────────────

#[test]
fn mismatched_lists_truncate_to_shorter() {
    let board = Board::load(&fixture("mismatched.json")).unwrap();
    assert_eq!(
        notes_of(&board),
        vec![
            ("a".to_string(), Point::new(0.0, 0.0)),
            ("b".to_string(), Point::new(1.0, 1.0)),
        ]
    );
}

#[test]
fn degenerate_transform_is_rejected_on_load() {
    let err = Board::load(&fixture("zero_scale.json")).err().unwrap();
    assert!(matches!(err, BoardError::InvalidTransform { .. }));
}

#[test]
fn matrix_layout_board_loads_and_resaves_in_current_layout() {
    let mut board = Board::load(&fixture("legacy_matrix.json")).unwrap();
    assert_eq!(board.transform().scale_x(), 2.0);
    assert_eq!(board.transform().scale_y(), 2.0);
    assert_eq!(board.transform().offset(), Vec2::new(40.0, -10.0));
    // (5, 7.5) * 2 + (40, -10)
    assert_eq!(board.placements()[0].1.translation(), Vec2::new(50.0, 5.0));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resaved.json");
    board.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"ScaleX\": 2.0"));
    assert!(!text.contains("M11"));
    assert_eq!(notes_of(&Board::load(&path).unwrap()), notes_of(&board));
}

#[test]
fn non_finite_edits_never_reach_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let mut board = Board::new();
    let id = board.add_note("kept", Point::new(10.0, 10.0)).unwrap();
    let err = board.drag_note(id, f64::NAN, 0.0).unwrap_err();
    assert!(matches!(err, BoardError::InvalidPosition { .. }));

    board.zoom(Point::ORIGIN, 1e-300).unwrap();
    let err = board.add_note("lost", Point::new(1e10, 0.0)).unwrap_err();
    assert!(matches!(err, BoardError::InvalidPosition { .. }));

    board.save(&path).unwrap();
    let reloaded = Board::load(&path).unwrap();
    assert_eq!(
        notes_of(&reloaded),
        vec![("kept".to_string(), Point::new(10.0, 10.0))]
    );
}

#[test]
fn batch_load_isolates_failures() {
    let paths = [
        fixture("two_notes.json"),
        fixture("truncated.json"),
        fixture("does_not_exist.json"),
        fixture("mismatched.json"),
    ];
    let results = load_boards(&paths, &BoardConfig::default());

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].1.as_ref().unwrap().note_count(), 2);
    assert!(matches!(results[1].1, Err(BoardError::Parse(_))));
    assert!(matches!(results[2].1, Err(BoardError::Io { .. })));
    assert_eq!(results[3].1.as_ref().unwrap().note_count(), 2);
    assert_eq!(results[2].0, paths[2]);
}

#[test]
fn failed_save_keeps_board_dirty() {
    let dir = tempfile::tempdir().unwrap();
    let bad_path = dir.path().join("missing-dir").join("board.json");

    let mut board = Board::new();
    board.add_note("unsaved", Point::ORIGIN).unwrap();
    let err = board.save(&bad_path).unwrap_err();

    assert!(matches!(err, BoardError::Io { .. }));
    assert!(board.is_dirty());
    assert_eq!(board.note_count(), 1);
    assert!(board.path().is_none());
}

// ─── Dirty tracking ─────────────────────────────────────────────────────

#[test]
fn save_clears_dirty_and_edits_set_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");

    let mut board = Board::new();
    let id = board.add_note("n", Point::new(5.0, 5.0)).unwrap();
    assert!(board.is_dirty());

    board.save(&path).unwrap();
    assert!(!board.is_dirty());
    assert!(board.matches_file(&path).unwrap());

    board.drag_note(id, 1.0, 0.0).unwrap();
    assert!(board.is_dirty());
    assert!(!board.matches_file(&path).unwrap());

    // Dragging back restores the saved bytes exactly.
    board.drag_note(id, -1.0, 0.0).unwrap();
    assert!(!board.is_dirty());
}

#[test]
fn compact_config_writes_single_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compact.json");
    let config = BoardConfig {
        pretty: false,
        ..Default::default()
    };

    let mut board = Board::with_config(config.clone());
    board.add_note("x", Point::ORIGIN).unwrap();
    board.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains('\n'));
    let reloaded = Board::load_with_config(&path, config).unwrap();
    assert!(!reloaded.is_dirty());
}

// ─── Interaction ────────────────────────────────────────────────────────

#[test]
fn drag_speed_is_zoom_invariant() {
    let mut at_one = Board::new();
    let a = at_one.add_note_at_base("a", Point::ORIGIN).unwrap();
    at_one.drag_note(a, 40.0, 20.0).unwrap();

    let mut at_two = Board::new();
    let b = at_two.add_note_at_base("b", Point::ORIGIN).unwrap();
    at_two.zoom(Point::new(400.0, 300.0), 2.0).unwrap();
    at_two.drag_note(b, 40.0, 20.0).unwrap();

    let moved_one = at_one.model().get(a).unwrap().base_position().to_vec2();
    let moved_two = at_two.model().get(b).unwrap().base_position().to_vec2();
    assert_eq!(moved_one, Vec2::new(40.0, 20.0));
    assert_eq!(moved_two, moved_one / 2.0);
}

#[test]
fn removal_keeps_second_note_intact() {
    let mut board = Board::new();
    let first = board.add_note("first", Point::new(1.0, 2.0)).unwrap();
    let second = board.add_note("second", Point::new(30.0, 40.0)).unwrap();
    board.register_render_handle(first, RenderHandle(1));
    board.register_render_handle(second, RenderHandle(2));

    let removed = board.remove_note(first).unwrap();
    assert_eq!(removed.render_handle(), Some(RenderHandle(1)));

    let placements = board.placements();
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].0, second);
    assert_eq!(placements[0].1.translation(), Vec2::new(30.0, 40.0));
    assert_eq!(board.note_text(second), Some("second"));

    // Removing again is a no-op.
    assert!(board.remove_note(first).is_none());
    assert_eq!(board.note_count(), 1);
}

#[test]
fn full_gesture_sequence_then_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gesture.json");

    let mut board = Board::new();
    let id = board.add_note("drag me", Point::new(100.0, 100.0)).unwrap();

    // Pan the canvas, zoom, then drag the note.
    let hit = board.note_at(Point::new(0.0, 0.0), |_| Some(NOTE_SIZE));
    assert_eq!(hit, None);
    for event in [
        InputEvent::pointer_down(0.0, 0.0),
        InputEvent::pointer_move(50.0, 0.0),
        InputEvent::pointer_up(50.0, 0.0),
    ] {
        board.handle_input(&event, hit).unwrap();
    }
    board
        .handle_input(
            &InputEvent::Zoom {
                x: 150.0,
                y: 100.0,
                factor: 4.0,
            },
            None,
        )
        .unwrap();
    let hit = board.note_at(Point::new(150.0, 100.0), |_| Some(NOTE_SIZE));
    assert_eq!(hit, Some(id));
    for event in [
        InputEvent::pointer_down(150.0, 100.0),
        InputEvent::pointer_move(190.0, 140.0),
        InputEvent::pointer_up(190.0, 140.0),
    ] {
        board.handle_input(&event, hit).unwrap();
    }

    assert_eq!(
        board.model().get(id).unwrap().base_position(),
        Point::new(110.0, 110.0)
    );

    board.save(&path).unwrap();
    let reloaded = Board::load(&path).unwrap();
    assert_eq!(notes_of(&reloaded), notes_of(&board));
}
