//! `nb` — command-line front-end for note board files.
//!
//! Every editing command loads the board, applies one collaborator call, and
//! saves it back only if the board became dirty.

use clap::{Parser, Subcommand};
use nb_core::{EntryId, Point};
use nb_editor::{Board, BoardConfig, load_boards};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "nb", version, about = "Inspect and edit note board files")]
struct Cli {
    /// JSON editor configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty board.
    New { file: PathBuf },
    /// Add a note at a view-space position.
    Add {
        file: PathBuf,
        text: String,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },
    /// Print notes with base positions and view placements.
    List { file: PathBuf },
    /// Remove the note at a z-order index.
    Remove { file: PathBuf, index: usize },
    /// Pan the canvas by a view-space delta.
    Pan {
        file: PathBuf,
        #[arg(allow_hyphen_values = true)]
        dx: f64,
        #[arg(allow_hyphen_values = true)]
        dy: f64,
    },
    /// Zoom about a view-space point.
    Zoom {
        file: PathBuf,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
        factor: f64,
    },
    /// Move the note at a z-order index by a view-space delta.
    Move {
        file: PathBuf,
        index: usize,
        #[arg(allow_hyphen_values = true)]
        dx: f64,
        #[arg(allow_hyphen_values = true)]
        dy: f64,
    },
    /// Load several boards and report each one.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> nb_core::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };

    match cli.command {
        Command::New { file } => {
            let mut board = Board::with_config(config);
            board.save(&file)?;
            log::info!("created {}", file.display());
        }
        Command::Add { file, text, x, y } => {
            edit(&file, config, |board| {
                let id = board.add_note(text, Point::new(x, y))?;
                log::info!("added note {id}");
                Ok(())
            })?;
        }
        Command::List { file } => {
            let board = Board::load_with_config(&file, config)?;
            let t = board.transform();
            println!(
                "transform: offset ({}, {}), scale ({}, {})",
                t.offset_x(),
                t.offset_y(),
                t.scale_x(),
                t.scale_y()
            );
            for (index, note) in board.notes().enumerate() {
                let base = note.base_position();
                let view = note.placement().translation();
                println!(
                    "{index:>3}  base ({}, {})  view ({}, {})  {:?}",
                    base.x, base.y, view.x, view.y, note.payload
                );
            }
        }
        Command::Remove { file, index } => {
            edit(&file, config, |board| {
                let id = note_at(board, index)?;
                board.remove_note(id);
                Ok(())
            })?;
        }
        Command::Pan { file, dx, dy } => {
            edit(&file, config, |board| board.pan(dx, dy))?;
        }
        Command::Zoom { file, x, y, factor } => {
            edit(&file, config, |board| board.zoom(Point::new(x, y), factor))?;
        }
        Command::Move {
            file,
            index,
            dx,
            dy,
        } => {
            edit(&file, config, |board| {
                let id = note_at(board, index)?;
                board.drag_note(id, dx, dy)?;
                Ok(())
            })?;
        }
        Command::Check { files } => {
            let mut failed = false;
            for (path, result) in load_boards(&files, &config) {
                match result {
                    Ok(board) => {
                        println!("ok     {}  ({} notes)", path.display(), board.note_count());
                    }
                    Err(err) => {
                        failed = true;
                        println!("error  {}  {err}", path.display());
                    }
                }
            }
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Load, apply `f`, and save if anything changed.
fn edit(
    file: &Path,
    config: BoardConfig,
    f: impl FnOnce(&mut Board) -> nb_core::Result<()>,
) -> nb_core::Result<()> {
    let mut board = Board::load_with_config(file, config)?;
    f(&mut board)?;
    if board.is_dirty() {
        board.save(file)?;
        log::info!("saved {}", file.display());
    } else {
        log::info!("no changes to {}", file.display());
    }
    Ok(())
}

fn note_at(board: &Board, index: usize) -> nb_core::Result<EntryId> {
    board
        .notes()
        .nth(index)
        .map(|e| e.id())
        .ok_or(nb_core::BoardError::NoteIndex {
            index,
            count: board.note_count(),
        })
}
