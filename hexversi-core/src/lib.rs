//! HEXVERSI Core - Rules engine and move selection
//!
//! This crate provides the core game logic for HEXVERSI, disc-flipping on a
//! hexagonal board:
//! - Board geometry (hex grid addressed by diagonal and row)
//! - Sandwich capture and move legality
//! - Game state, turn flow and observers
//! - Heuristic strategies and a one-ply lookahead

pub mod board;
pub mod capture;
pub mod game;
pub mod strategy;
pub mod ai;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use board::{Board, BoardSnapshot, Cell, Coord, Direction, Disc, Opening, DIRECTIONS};
pub use capture::{capture_count, captures, is_legal, legal_moves, Run};
pub use game::{
    DiscColor, GameObserver, GameState, Outcome, Phase, Player, Scores, TracingObserver,
};
pub use strategy::{
    chained_picks, AnyOpenCorner, AvoidCorners, CaptureMax, Chained, Strategy, StrategyKind,
};
pub use ai::{play_game, random_plies, GameSummary, MachinePlayer, Minimax, Turn};
pub use config::GameConfig;
pub use error::GameError;
