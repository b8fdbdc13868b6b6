//! Move-selection heuristics
//!
//! Every strategy reads the board and never mutates it. `None` means the
//! policy found nothing to play; drivers answer that with a pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::Minimax;
use crate::board::{Board, Coord};
use crate::capture;
use crate::error::GameError;
use crate::game::Player;

/// A move-selection policy
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn choose(&self, board: &Board, player: Player) -> Option<Coord>;
}

// ============================================================================
// HEURISTICS
// ============================================================================

/// Greedy: the empty cell that flips the most discs.
///
/// Ties go to the lowest diagonal, then the lowest row. When nothing
/// captures, a zero-capture cell is still returned; only a full board
/// yields `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureMax;

impl Strategy for CaptureMax {
    fn name(&self) -> &'static str {
        "capture-max"
    }

    fn choose(&self, board: &Board, player: Player) -> Option<Coord> {
        let pick = board
            .cells()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(coord, _)| (capture::capture_count(board, coord, player), coord))
            .max_by(|(n1, c1), (n2, c2)| n1.cmp(n2).then(c2.cmp(c1)))
            .map(|(_, coord)| coord);
        tracing::trace!("capture-max for {:?}: {:?}", player, pick);
        pick
    }
}

/// First empty cell, in board order, that does not touch a corner
#[derive(Clone, Copy, Debug, Default)]
pub struct AvoidCorners;

impl Strategy for AvoidCorners {
    fn name(&self) -> &'static str {
        "avoid-corners"
    }

    fn choose(&self, board: &Board, player: Player) -> Option<Coord> {
        let pick = board
            .cells()
            .find(|&(coord, cell)| cell.is_empty() && !board.is_corner_adjacent(coord))
            .map(|(coord, _)| coord);
        tracing::trace!("avoid-corners for {:?}: {:?}", player, pick);
        pick
    }
}

/// First empty corner, clockwise from the top-left
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyOpenCorner;

impl Strategy for AnyOpenCorner {
    fn name(&self) -> &'static str {
        "any-open-corner"
    }

    fn choose(&self, board: &Board, player: Player) -> Option<Coord> {
        let pick = board
            .corners()
            .into_iter()
            .find(|&corner| board.cell_at(corner).is_empty());
        tracing::trace!("any-open-corner for {:?}: {:?}", player, pick);
        pick
    }
}

/// The three single-position heuristics, in the order lookahead consults them
pub fn base_strategies() -> [&'static dyn Strategy; 3] {
    [&CaptureMax, &AvoidCorners, &AnyOpenCorner]
}

// ============================================================================
// CHAINING
// ============================================================================

/// Picks of several strategies that tie or beat the best capture seen so far.
///
/// Strategies are asked in order. The running best starts at zero; a pick
/// scoring above it raises it, a pick matching it is kept too, and a pick
/// below it is dropped. Picks already kept are never removed, so the last
/// entry always carries the highest score.
pub fn chained_picks(
    board: &Board,
    player: Player,
    strategies: &[&dyn Strategy],
) -> Vec<Coord> {
    let mut best = 0;
    let mut picks = Vec::new();

    for strategy in strategies {
        let Some(coord) = strategy.choose(board, player) else {
            continue;
        };
        let score = capture::capture_count(board, coord, player);
        if score >= best {
            best = score;
            picks.push(coord);
        }
    }
    picks
}

/// Every other strategy combined: plays the highest-scoring chained pick
pub struct Chained {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Chained {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// All picks that survived chaining, in the order they were made
    pub fn picks(&self, board: &Board, player: Player) -> Vec<Coord> {
        let chain: Vec<&dyn Strategy> = self.strategies.iter().map(|s| s.as_ref()).collect();
        chained_picks(board, player, &chain)
    }
}

impl Default for Chained {
    fn default() -> Self {
        Self::new(vec![
            Box::new(CaptureMax),
            Box::new(AvoidCorners),
            Box::new(AnyOpenCorner),
            Box::new(Minimax),
        ])
    }
}

impl Strategy for Chained {
    fn name(&self) -> &'static str {
        "chained"
    }

    fn choose(&self, board: &Board, player: Player) -> Option<Coord> {
        let pick = self.picks(board, player).last().copied();
        tracing::trace!("chained for {:?}: {:?}", player, pick);
        pick
    }
}

// ============================================================================
// STRATEGY SELECTION
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    CaptureMax,
    AvoidCorners,
    AnyOpenCorner,
    Minimax,
    Chained,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::CaptureMax,
        StrategyKind::AvoidCorners,
        StrategyKind::AnyOpenCorner,
        StrategyKind::Minimax,
        StrategyKind::Chained,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::CaptureMax => "capture-max",
            StrategyKind::AvoidCorners => "avoid-corners",
            StrategyKind::AnyOpenCorner => "any-open-corner",
            StrategyKind::Minimax => "minimax",
            StrategyKind::Chained => "chained",
        }
    }

    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::CaptureMax => Box::new(CaptureMax),
            StrategyKind::AvoidCorners => Box::new(AvoidCorners),
            StrategyKind::AnyOpenCorner => Box::new(AnyOpenCorner),
            StrategyKind::Minimax => Box::new(Minimax),
            StrategyKind::Chained => Box::new(Chained::default()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| GameError::ConfigError(format!("unknown strategy: {}", s)))
    }
}
