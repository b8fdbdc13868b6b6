//! One-ply lookahead and machine-driven play

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord};
use crate::capture;
use crate::error::GameError;
use crate::game::{GameState, Outcome, Player, Scores};
use crate::strategy::{base_strategies, Strategy, StrategyKind};

// ============================================================================
// MINIMAX
// ============================================================================

/// Bounded adversarial choice.
///
/// Candidates come from the three base heuristics. Each one is played on a
/// cloned board, and the opponent's reply is judged only by what those same
/// heuristics would pick: the reply flipping the most discs sets the
/// candidate's response score. This is not a search over all legal replies.
///
/// The running minimum starts at zero and only a strictly lower score
/// replaces it. Response scores are capture counts, so no candidate ever
/// qualifies and the choice is always `None`; drivers pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct Minimax;

impl Minimax {
    /// Candidate cells in evaluation order, duplicates dropped
    pub fn candidates(board: &Board, player: Player) -> Vec<Coord> {
        let mut seen = FxHashSet::default();
        base_strategies()
            .iter()
            .filter_map(|strategy| strategy.choose(board, player))
            .filter(|&coord| seen.insert(coord))
            .collect()
    }

    /// Largest capture the opponent's heuristic replies would make after
    /// `player` plays `candidate`; `None` if the candidate is not legal.
    pub fn response_score(board: &Board, candidate: Coord, player: Player) -> Option<usize> {
        let mut sim = board.clone();
        capture::place(&mut sim, candidate, player).ok()?;

        let opponent = player.opponent();
        let score = base_strategies()
            .iter()
            .filter_map(|strategy| strategy.choose(&sim, opponent))
            .map(|reply| capture::capture_count(&sim, reply, opponent))
            .max()
            .unwrap_or(0);
        Some(score)
    }
}

impl Strategy for Minimax {
    fn name(&self) -> &'static str {
        "minimax"
    }

    fn choose(&self, board: &Board, player: Player) -> Option<Coord> {
        let mut low = 0;
        let mut best = None;

        for candidate in Self::candidates(board, player) {
            let Some(score) = Self::response_score(board, candidate, player) else {
                tracing::trace!("minimax skips illegal candidate {}", candidate);
                continue;
            };
            tracing::trace!("minimax candidate {} -> reply {}", candidate, score);
            if score < low {
                low = score;
                best = Some(candidate);
            }
        }

        best
    }
}

// ============================================================================
// MACHINE PLAYER
// ============================================================================

/// What a machine player did with its turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Moved { coord: Coord, flipped: Vec<Coord> },
    /// `rejected` holds the strategy's pick when the game refused it
    Passed { rejected: Option<Coord> },
}

/// A seat driven by a strategy
pub struct MachinePlayer {
    pub player: Player,
    strategy: Box<dyn Strategy>,
}

impl MachinePlayer {
    pub fn new(player: Player, strategy: Box<dyn Strategy>) -> Self {
        Self { player, strategy }
    }

    pub fn from_kind(player: Player, kind: StrategyKind) -> Self {
        Self::new(player, kind.build())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Ask the strategy for a cell and play it, passing when it has nothing
    /// or the game rejects the pick.
    pub fn take_turn(&self, game: &mut GameState) -> Result<Turn, GameError> {
        let Some(coord) = self.strategy.choose(game.board(), self.player) else {
            game.pass(self.player)?;
            return Ok(Turn::Passed { rejected: None });
        };

        match game.make_move(self.player, coord) {
            Ok(flipped) => Ok(Turn::Moved { coord, flipped }),
            Err(err) if err.is_retryable() => {
                tracing::debug!(
                    "{} pick for {:?} rejected: {}",
                    self.strategy.name(),
                    self.player,
                    err
                );
                game.pass(self.player)?;
                Ok(Turn::Passed {
                    rejected: Some(coord),
                })
            }
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// GAME LOOP
// ============================================================================

/// Result of a machine-vs-machine game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub scores: Scores,
    /// `None` when the game stopped on a stall or the turn limit
    pub outcome: Option<Outcome>,
    pub turns: u32,
    pub moves: u32,
    pub passes: u32,
    /// Both players passed back to back with moves still on the board
    pub stalled: bool,
}

/// Play `a` against `b` until the game ends, stalls, or `max_turns` is hit.
///
/// Starts the game if it has not been started yet.
pub fn play_game(
    game: &mut GameState,
    a: &MachinePlayer,
    b: &MachinePlayer,
    max_turns: u32,
) -> Result<GameSummary, GameError> {
    if a.player != Player::A || b.player != Player::B {
        return Err(GameError::ConfigError(
            "machine players must sit in seats A and B".to_string(),
        ));
    }
    if !game.is_started() {
        game.start()?;
    }

    let mut turns = 0;
    let mut moves = 0;
    let mut passes = 0;
    let mut passes_in_a_row = 0;
    let mut stalled = false;

    while !game.is_finished() && turns < max_turns {
        let seat = match game.current_player() {
            Player::A => a,
            Player::B => b,
        };

        match seat.take_turn(game)? {
            Turn::Moved { .. } => {
                moves += 1;
                passes_in_a_row = 0;
            }
            Turn::Passed { .. } => {
                passes += 1;
                passes_in_a_row += 1;
            }
        }
        turns += 1;

        if passes_in_a_row >= 2 && !game.is_finished() {
            tracing::debug!("both players passed, stopping after {} turns", turns);
            stalled = true;
            break;
        }
    }

    Ok(GameSummary {
        scores: game.scores()?,
        outcome: game.outcome(),
        turns,
        moves,
        passes,
        stalled,
    })
}

/// Open the game with up to `plies` uniformly random legal moves.
///
/// A player with no legal move passes. Returns how many discs were placed.
pub fn random_plies<R: Rng>(
    game: &mut GameState,
    plies: u32,
    rng: &mut R,
) -> Result<u32, GameError> {
    if !game.is_started() {
        game.start()?;
    }

    let mut placed = 0;
    for _ in 0..plies {
        if game.is_finished() {
            break;
        }
        let player = game.current_player();
        let moves = capture::legal_moves(game.board(), player);
        match moves.choose(rng) {
            Some(&coord) => {
                game.make_move(player, coord)?;
                placed += 1;
            }
            None => game.pass(player)?,
        }
    }
    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use crate::strategy::{AnyOpenCorner, AvoidCorners, CaptureMax};

    /// A can take two discs at (1, 3) or one at (6, 3); the bigger capture
    /// lets B sweep the whole row back.
    fn trap_board() -> Board {
        let mut board = Board::empty(4).unwrap();
        for (d, r, player) in [
            (0, 0, Player::A),
            (3, 0, Player::A),
            (4, 3, Player::A),
            (2, 3, Player::B),
            (3, 3, Player::B),
            (5, 3, Player::B),
        ] {
            board.set(Coord::new(d, r), Cell::Occupied(player)).unwrap();
        }
        board
    }

    #[test]
    fn test_response_scores() {
        let board = trap_board();
        assert_eq!(CaptureMax.choose(&board, Player::A), Some(Coord::new(1, 3)));
        assert_eq!(AvoidCorners.choose(&board, Player::A), Some(Coord::new(2, 1)));
        assert_eq!(AnyOpenCorner.choose(&board, Player::A), Some(Coord::new(6, 3)));

        let score = |d, r| Minimax::response_score(&board, Coord::new(d, r), Player::A);
        assert_eq!(score(1, 3), Some(4));
        assert_eq!(score(6, 3), Some(0));
        assert_eq!(score(2, 1), None);
    }

    #[test]
    fn test_minimax_floor_starts_at_zero() {
        // (6, 3) leaves B nothing to capture, but zero is not below the floor
        let board = trap_board();
        assert_eq!(Minimax.choose(&board, Player::A), None);
    }

    #[test]
    fn test_minimax_does_not_touch_board() {
        let board = trap_board();
        let before = board.clone();
        Minimax.choose(&board, Player::A);
        assert_eq!(board, before);
    }

    #[test]
    fn test_minimax_candidates_on_opening() {
        let board = Board::new(2).unwrap();
        assert_eq!(
            Minimax::candidates(&board, Player::A),
            vec![Coord::new(0, 1), Coord::new(2, 2)]
        );
        assert_eq!(Minimax::response_score(&board, Coord::new(0, 1), Player::A), Some(1));
        assert_eq!(Minimax.choose(&board, Player::A), None);
    }

    #[test]
    fn test_minimax_seat_passes() {
        let mut game = GameState::new(Board::new(2).unwrap());
        game.start().unwrap();

        let seat = MachinePlayer::from_kind(Player::A, StrategyKind::Minimax);
        assert_eq!(
            seat.take_turn(&mut game).unwrap(),
            Turn::Passed { rejected: None }
        );
        assert_eq!(game.current_player(), Player::B);
    }

    #[test]
    fn test_minimax_without_candidates() {
        let mut board = Board::empty(2).unwrap();
        for coord in board.all_coordinates().collect::<Vec<_>>() {
            board.set(coord, Cell::Occupied(Player::A)).unwrap();
        }
        assert_eq!(Minimax.choose(&board, Player::B), None);

        // Candidates exist but none of them captures anything
        let empty = Board::empty(3).unwrap();
        assert_eq!(Minimax.choose(&empty, Player::A), None);
    }

    #[test]
    fn test_take_turn_passes_on_rejection() {
        let mut game = GameState::new(Board::new(3).unwrap());
        game.start().unwrap();

        // Avoid-corners picks (0, 0), which captures nothing here
        let seat = MachinePlayer::from_kind(Player::A, StrategyKind::AvoidCorners);
        let turn = seat.take_turn(&mut game).unwrap();
        assert_eq!(
            turn,
            Turn::Passed {
                rejected: Some(Coord::new(0, 0))
            }
        );
        assert_eq!(game.current_player(), Player::B);
    }

    #[test]
    fn test_capture_max_game_on_smallest_board() {
        let mut game = GameState::new(Board::new(2).unwrap());
        let a = MachinePlayer::from_kind(Player::A, StrategyKind::CaptureMax);
        let b = MachinePlayer::from_kind(Player::B, StrategyKind::CaptureMax);

        let summary = play_game(&mut game, &a, &b, 100).unwrap();
        assert_eq!(summary.moves, 3);
        assert_eq!(summary.passes, 0);
        assert!(!summary.stalled);
        assert_eq!(summary.scores, Scores { a: 5, b: 2 });
        assert_eq!(summary.outcome, Some(Outcome::Winner(Player::A)));
    }

    #[test]
    fn test_stall_is_detected() {
        let mut game = GameState::new(Board::new(2).unwrap());
        let a = MachinePlayer::from_kind(Player::A, StrategyKind::AvoidCorners);
        let b = MachinePlayer::from_kind(Player::B, StrategyKind::AvoidCorners);

        let summary = play_game(&mut game, &a, &b, 100).unwrap();
        assert!(summary.stalled);
        assert_eq!(summary.passes, 2);
        assert_eq!(summary.moves, 0);
        assert_eq!(summary.outcome, None);
    }

    #[test]
    fn test_turn_limit() {
        let mut game = GameState::new(Board::new(6).unwrap());
        let a = MachinePlayer::from_kind(Player::A, StrategyKind::CaptureMax);
        let b = MachinePlayer::from_kind(Player::B, StrategyKind::Minimax);

        let summary = play_game(&mut game, &a, &b, 4).unwrap();
        assert_eq!(summary.turns, 4);
        assert_eq!(summary.outcome, None);
    }

    #[test]
    fn test_random_plies_are_reproducible() {
        let play = |seed| {
            let mut game = GameState::new(Board::new(5).unwrap());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let placed = random_plies(&mut game, 6, &mut rng).unwrap();
            (placed, game.board().clone())
        };

        let (placed, board) = play(7);
        assert!(placed > 0 && placed <= 6);
        assert_eq!(board.cell_count() - board.empty_count(), 4 + placed as usize);
        assert_eq!(play(7), (placed, board));
    }

    #[test]
    fn test_seats_must_match() {
        let mut game = GameState::new(Board::new(3).unwrap());
        let a = MachinePlayer::from_kind(Player::B, StrategyKind::CaptureMax);
        let b = MachinePlayer::from_kind(Player::A, StrategyKind::CaptureMax);
        assert!(matches!(
            play_game(&mut game, &a, &b, 10),
            Err(GameError::ConfigError(_))
        ));
    }
}
