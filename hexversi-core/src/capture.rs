//! Sandwich-capture computation
//!
//! This module is the only authority on move legality. A move is legal when
//! the target cell is empty and at least one direction holds a run of
//! opponent discs closed off by one of the mover's own discs.

use crate::board::{Board, Cell, Coord, Direction, DIRECTIONS};
use crate::error::GameError;
use crate::game::Player;

/// Opponent discs a move would flip along one direction, nearest first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub direction: Direction,
    pub cells: Vec<Coord>,
}

impl Run {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Runs captured by `player` placing a disc at `coord`, in direction order.
///
/// An empty result means the move is illegal. The target must be an empty
/// on-board cell; anything else is an `InvalidTarget` contract violation.
pub fn captures(board: &Board, coord: Coord, player: Player) -> Result<Vec<Run>, GameError> {
    if board.cell_at(coord) != Cell::Empty {
        return Err(GameError::InvalidTarget(coord));
    }

    Ok(DIRECTIONS
        .iter()
        .filter_map(|&dir| run_in_direction(board, coord, player, dir))
        .collect())
}

/// Walk outward from `from`; keep the opponent run only if one of
/// `player`'s discs closes it.
fn run_in_direction(
    board: &Board,
    from: Coord,
    player: Player,
    direction: Direction,
) -> Option<Run> {
    let opponent = player.opponent();
    let mut cells = Vec::new();
    let mut cursor = board.neighbor(from, direction);

    while let Some(pos) = cursor {
        match board.cell_at(pos) {
            Cell::Occupied(owner) if owner == opponent => {
                cells.push(pos);
                cursor = board.neighbor(pos, direction);
            }
            Cell::Occupied(_) => {
                return (!cells.is_empty()).then_some(Run { direction, cells });
            }
            Cell::Empty | Cell::OffBoard => return None,
        }
    }

    // Walked off the edge without closing the run
    None
}

/// Total discs flipped by the move; 0 for illegal moves and non-empty cells
pub fn capture_count(board: &Board, coord: Coord, player: Player) -> usize {
    captures(board, coord, player)
        .map(|runs| runs.iter().map(Run::len).sum())
        .unwrap_or(0)
}

pub fn is_legal(board: &Board, coord: Coord, player: Player) -> bool {
    capture_count(board, coord, player) > 0
}

/// Legal targets for `player`, in board enumeration order
pub fn legal_moves(board: &Board, player: Player) -> Vec<Coord> {
    board
        .all_coordinates()
        .filter(|&coord| is_legal(board, coord, player))
        .collect()
}

pub fn has_legal_move(board: &Board, player: Player) -> bool {
    board
        .all_coordinates()
        .any(|coord| is_legal(board, coord, player))
}

/// Validate and commit a move: place the disc and flip every captured run.
///
/// Returns the flipped coordinates. Nothing is written unless the move is
/// legal.
pub fn place(board: &mut Board, coord: Coord, player: Player) -> Result<Vec<Coord>, GameError> {
    match board.cell_at(coord) {
        Cell::OffBoard => return Err(GameError::InvalidTarget(coord)),
        Cell::Occupied(_) => return Err(GameError::OccupiedTarget(coord)),
        Cell::Empty => {}
    }

    let runs = captures(board, coord, player)?;
    if runs.is_empty() {
        return Err(GameError::IllegalMove(coord));
    }

    let flipped: Vec<Coord> = runs.into_iter().flat_map(|run| run.cells).collect();
    board.set(coord, Cell::Occupied(player))?;
    for &pos in &flipped {
        board.set(pos, Cell::Occupied(player))?;
    }
    Ok(flipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(board: &mut Board, discs: &[(i32, i32, Player)]) {
        for &(d, r, player) in discs {
            board.set(Coord::new(d, r), Cell::Occupied(player)).unwrap();
        }
    }

    #[test]
    fn test_opening_captures() {
        let board = Board::new(2).unwrap();

        let runs = captures(&board, Coord::new(0, 1), Player::A).unwrap();
        assert_eq!(
            runs,
            vec![Run {
                direction: Direction::Right,
                cells: vec![Coord::new(1, 1)],
            }]
        );

        let runs = captures(&board, Coord::new(2, 2), Player::A).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].direction, Direction::TopLeft);

        assert!(captures(&board, Coord::new(1, 2), Player::A).unwrap().is_empty());
        assert_eq!(
            legal_moves(&board, Player::A),
            vec![Coord::new(0, 1), Coord::new(2, 2)]
        );
    }

    #[test]
    fn test_invalid_targets() {
        let board = Board::new(2).unwrap();
        assert_eq!(
            captures(&board, Coord::new(0, 0), Player::A),
            Err(GameError::InvalidTarget(Coord::new(0, 0)))
        );
        assert_eq!(
            captures(&board, Coord::new(-1, 4), Player::A),
            Err(GameError::InvalidTarget(Coord::new(-1, 4)))
        );
        assert_eq!(capture_count(&board, Coord::new(0, 0), Player::A), 0);
    }

    #[test]
    fn test_open_run_is_discarded() {
        let mut board = Board::empty(3).unwrap();
        put(&mut board, &[(1, 1, Player::B)]);
        assert!(!is_legal(&board, Coord::new(0, 1), Player::A));

        put(&mut board, &[(2, 1, Player::A)]);
        assert_eq!(capture_count(&board, Coord::new(0, 1), Player::A), 1);
    }

    #[test]
    fn test_run_ending_at_edge_is_discarded() {
        let mut board = Board::empty(3).unwrap();
        // Row 0 holds diagonals 0..=2; the run reaches the edge unclosed
        put(&mut board, &[(1, 0, Player::B), (2, 0, Player::B)]);
        assert!(!is_legal(&board, Coord::new(0, 0), Player::A));
    }

    #[test]
    fn test_long_run_and_multiple_directions() {
        let mut board = Board::empty(4).unwrap();
        put(
            &mut board,
            &[
                (1, 3, Player::B),
                (2, 3, Player::B),
                (3, 3, Player::B),
                (4, 3, Player::A),
                (1, 4, Player::B),
                (2, 5, Player::A),
            ],
        );

        let runs = captures(&board, Coord::new(0, 3), Player::A).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].direction, Direction::Right);
        assert_eq!(
            runs[0].cells,
            vec![Coord::new(1, 3), Coord::new(2, 3), Coord::new(3, 3)]
        );
        assert_eq!(runs[1].direction, Direction::BottomRight);
        assert_eq!(capture_count(&board, Coord::new(0, 3), Player::A), 4);
    }

    #[test]
    fn test_own_disc_adjacent_yields_nothing() {
        let mut board = Board::empty(3).unwrap();
        put(&mut board, &[(1, 1, Player::A), (2, 1, Player::A)]);
        assert!(captures(&board, Coord::new(0, 1), Player::A).unwrap().is_empty());
    }

    #[test]
    fn test_place_commits_all_flips() {
        let mut board = Board::new(2).unwrap();
        let flipped = place(&mut board, Coord::new(0, 1), Player::A).unwrap();
        assert_eq!(flipped, vec![Coord::new(1, 1)]);
        assert_eq!(board.cell_at(Coord::new(0, 1)), Cell::Occupied(Player::A));
        assert_eq!(board.cell_at(Coord::new(1, 1)), Cell::Occupied(Player::A));
        assert_eq!(board.count(Player::A), 4);
        assert_eq!(board.count(Player::B), 1);
    }

    #[test]
    fn test_place_rejects_without_mutation() {
        let mut board = Board::new(2).unwrap();
        let before = board.clone();

        assert_eq!(
            place(&mut board, Coord::new(1, 2), Player::A),
            Err(GameError::IllegalMove(Coord::new(1, 2)))
        );
        assert_eq!(
            place(&mut board, Coord::new(1, 0), Player::A),
            Err(GameError::OccupiedTarget(Coord::new(1, 0)))
        );
        assert_eq!(
            place(&mut board, Coord::new(9, 9), Player::A),
            Err(GameError::InvalidTarget(Coord::new(9, 9)))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_players_never_share_runs() {
        let board = Board::with_opening(4, crate::board::Opening::Ring).unwrap();
        for coord in board.all_coordinates() {
            if board.cell_at(coord) != Cell::Empty {
                continue;
            }
            let a: Vec<Coord> = captures(&board, coord, Player::A)
                .unwrap()
                .into_iter()
                .flat_map(|r| r.cells)
                .collect();
            let b: Vec<Coord> = captures(&board, coord, Player::B)
                .unwrap()
                .into_iter()
                .flat_map(|r| r.cells)
                .collect();
            assert!(a.iter().all(|c| !b.contains(c)), "{}", coord);
        }
    }
}
