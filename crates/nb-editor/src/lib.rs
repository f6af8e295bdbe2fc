pub mod board;
pub mod config;
pub mod input;
pub mod tools;

pub use board::{Board, BoardMutation, load_boards};
pub use config::BoardConfig;
pub use input::InputEvent;
pub use tools::{ContextTarget, DragState, DragTarget, DragTool};
