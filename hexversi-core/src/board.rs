//! Hex board geometry and cell storage
//!
//! Cells are addressed by `(diagonal, row)`. For a board of size `s` the
//! playable hexagon is every coordinate with `0 <= d, r <= 2s-2` and
//! `|d - r| <= s-1`, so row `r` runs from diagonal `max(0, r-(s-1))` to
//! `min(2s-2, r+(s-1))`. The top row holds `s` cells, the middle row `2s-1`.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::game::Player;

/// Smallest playable board size
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest board size accepted at construction
pub const MAX_BOARD_SIZE: usize = 64;

// ============================================================================
// COORDINATES AND DIRECTIONS
// ============================================================================

/// Board coordinate.
///
/// Ordering compares the diagonal first, then the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub diagonal: i32,
    pub row: i32,
}

impl Coord {
    pub const fn new(diagonal: i32, row: i32) -> Self {
        Self { diagonal, row }
    }

    /// Coordinate one step away in `direction`, without any range check
    pub fn offset(self, direction: Direction) -> Coord {
        let (dd, dr) = direction.delta();
        Coord::new(self.diagonal + dd, self.row + dr)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.diagonal, self.row)
    }
}

/// The six hex adjacency directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// All directions, in the order capture runs are reported
pub const DIRECTIONS: [Direction; 6] = [
    Direction::Left,
    Direction::Right,
    Direction::TopLeft,
    Direction::TopRight,
    Direction::BottomLeft,
    Direction::BottomRight,
];

impl Direction {
    /// Coordinate delta as (diagonal, row)
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::TopLeft => (-1, -1),
            Direction::TopRight => (0, -1),
            Direction::BottomLeft => (0, 1),
            Direction::BottomRight => (1, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::TopLeft => Direction::BottomRight,
            Direction::TopRight => Direction::BottomLeft,
            Direction::BottomLeft => Direction::TopRight,
            Direction::BottomRight => Direction::TopLeft,
        }
    }
}

/// The six sides of the hexagon.
///
/// `Top`, `Bottom`, `UpperLeft` and `LowerRight` are lines of constant row or
/// diagonal; `UpperRight` and `LowerLeft` are lines of constant `d - r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    UpperLeft,
    LowerRight,
    UpperRight,
    LowerLeft,
}

pub const EDGES: [Edge; 6] = [
    Edge::Top,
    Edge::Bottom,
    Edge::UpperLeft,
    Edge::LowerRight,
    Edge::UpperRight,
    Edge::LowerLeft,
];

impl Edge {
    /// Directions that leave the board from a cell on this edge
    pub const fn blocked(self) -> [Direction; 2] {
        match self {
            Edge::Top => [Direction::TopLeft, Direction::TopRight],
            Edge::Bottom => [Direction::BottomLeft, Direction::BottomRight],
            Edge::UpperLeft => [Direction::Left, Direction::TopLeft],
            Edge::LowerRight => [Direction::Right, Direction::BottomRight],
            Edge::UpperRight => [Direction::Right, Direction::TopRight],
            Edge::LowerLeft => [Direction::Left, Direction::BottomLeft],
        }
    }

    pub fn blocks(self, direction: Direction) -> bool {
        self.blocked().contains(&direction)
    }
}

// ============================================================================
// CELLS AND OPENINGS
// ============================================================================

/// State of a single cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Outside the hexagon. Only ever returned by lookups, never stored.
    OffBoard,
    Empty,
    Occupied(Player),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Occupied(player) => Some(player),
            _ => None,
        }
    }
}

/// Starting layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Opening {
    /// Four discs on the two rows nearest the centre, Othello style
    #[default]
    Classic,
    /// Six alternating discs around the empty centre cell
    Ring,
    /// No discs at all
    Empty,
}

impl FromStr for Opening {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Opening::Classic),
            "ring" => Ok(Opening::Ring),
            "empty" => Ok(Opening::Empty),
            other => Err(GameError::ConfigError(format!("unknown opening: {}", other))),
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Check that `size` is a playable board size
pub fn check_size(size: usize) -> Result<(), GameError> {
    if size < MIN_BOARD_SIZE {
        return Err(GameError::ConfigError(format!(
            "board size must be greater than 1, got {}",
            size
        )));
    }
    if size > MAX_BOARD_SIZE {
        return Err(GameError::ConfigError(format!(
            "board size must be at most {}, got {}",
            MAX_BOARD_SIZE, size
        )));
    }
    Ok(())
}

/// Inclusive diagonal bounds of `row`
fn row_bounds(size: i32, row: i32) -> (i32, i32) {
    let radius = size - 1;
    ((row - radius).max(0), (row + radius).min(2 * radius))
}

/// Hexagonal game board (clone to simulate)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Index into `cells` of the first cell of each row
    row_starts: Vec<usize>,
    /// Row-major, same order as `all_coordinates`
    cells: Vec<Cell>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Board with the classic four-disc opening
    pub fn new(size: usize) -> Result<Self, GameError> {
        Self::with_opening(size, Opening::Classic)
    }

    /// Board with no discs
    pub fn empty(size: usize) -> Result<Self, GameError> {
        check_size(size)?;

        let s = size as i32;
        let mut row_starts = Vec::with_capacity(2 * size - 1);
        let mut total = 0usize;
        for row in 0..(2 * s - 1) {
            row_starts.push(total);
            let (lo, hi) = row_bounds(s, row);
            total += (hi - lo + 1) as usize;
        }

        Ok(Self {
            size,
            row_starts,
            cells: vec![Cell::Empty; total],
        })
    }

    pub fn with_opening(size: usize, opening: Opening) -> Result<Self, GameError> {
        let mut board = Self::empty(size)?;
        let s = size as i32;

        let discs: Vec<(Coord, Player)> = match opening {
            Opening::Classic => vec![
                (Coord::new(s - 2, s - 2), Player::A),
                (Coord::new(s - 1, s - 2), Player::B),
                (Coord::new(s - 1, s - 1), Player::B),
                (Coord::new(s, s - 1), Player::A),
            ],
            Opening::Ring => {
                let center = board.center();
                [
                    (Direction::TopLeft, Player::A),
                    (Direction::TopRight, Player::B),
                    (Direction::Right, Player::A),
                    (Direction::BottomRight, Player::B),
                    (Direction::BottomLeft, Player::A),
                    (Direction::Left, Player::B),
                ]
                .into_iter()
                .map(|(dir, player)| (center.offset(dir), player))
                .collect()
            }
            Opening::Empty => Vec::new(),
        };

        for (coord, player) in discs {
            board.set(coord, Cell::Occupied(player))?;
        }
        Ok(board)
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of playable cells, `3s^2 - 3s + 1`
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Largest valid row or diagonal index
    fn last_index(&self) -> i32 {
        2 * (self.size as i32 - 1)
    }

    pub fn center(&self) -> Coord {
        let radius = self.size as i32 - 1;
        Coord::new(radius, radius)
    }

    pub fn contains(&self, coord: Coord) -> bool {
        if coord.row < 0 || coord.row > self.last_index() {
            return false;
        }
        let (lo, hi) = row_bounds(self.size as i32, coord.row);
        (lo..=hi).contains(&coord.diagonal)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let (lo, _) = row_bounds(self.size as i32, coord.row);
        Some(self.row_starts[coord.row as usize] + (coord.diagonal - lo) as usize)
    }

    fn on_edge(&self, coord: Coord, edge: Edge) -> bool {
        let radius = self.size as i32 - 1;
        match edge {
            Edge::Top => coord.row == 0,
            Edge::Bottom => coord.row == self.last_index(),
            Edge::UpperLeft => coord.diagonal == 0,
            Edge::LowerRight => coord.diagonal == self.last_index(),
            Edge::UpperRight => coord.diagonal - coord.row == radius,
            Edge::LowerLeft => coord.row - coord.diagonal == radius,
        }
    }

    /// Edges of the hexagon that `coord` lies on (none for interior cells)
    pub fn edges(&self, coord: Coord) -> impl Iterator<Item = Edge> + '_ {
        let on_board = self.contains(coord);
        EDGES
            .into_iter()
            .filter(move |&edge| on_board && self.on_edge(coord, edge))
    }

    /// Adjacent cell in `direction`, `None` past the edge of the board
    pub fn neighbor(&self, coord: Coord, direction: Direction) -> Option<Coord> {
        if !self.contains(coord) {
            return None;
        }
        if self.edges(coord).any(|edge| edge.blocks(direction)) {
            return None;
        }
        let next = coord.offset(direction);
        debug_assert!(self.contains(next), "edge rules missed {} -> {:?}", coord, direction);
        Some(next)
    }

    /// The six corners, clockwise from the top-left
    pub fn corners(&self) -> [Coord; 6] {
        let radius = self.size as i32 - 1;
        let last = self.last_index();
        [
            Coord::new(0, 0),
            Coord::new(radius, 0),
            Coord::new(last, radius),
            Coord::new(last, last),
            Coord::new(radius, last),
            Coord::new(0, radius),
        ]
    }

    pub fn is_corner(&self, coord: Coord) -> bool {
        self.corners().contains(&coord)
    }

    /// True if any direct neighbour of `coord` is a corner
    pub fn is_corner_adjacent(&self, coord: Coord) -> bool {
        let corners = self.corners();
        DIRECTIONS
            .iter()
            .filter_map(|&dir| self.neighbor(coord, dir))
            .any(|n| corners.contains(&n))
    }

    // ========================================================================
    // CELLS
    // ========================================================================

    /// Cell at `coord`; `OffBoard` outside the hexagon
    pub fn cell_at(&self, coord: Coord) -> Cell {
        self.index(coord)
            .map(|i| self.cells[i])
            .unwrap_or(Cell::OffBoard)
    }

    /// Overwrite one cell.
    ///
    /// Games only reach this through capture application, after the whole
    /// move has been validated.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> Result<(), GameError> {
        if cell == Cell::OffBoard {
            return Err(GameError::InvalidTarget(coord));
        }
        let i = self.index(coord).ok_or(GameError::InvalidTarget(coord))?;
        self.cells[i] = cell;
        Ok(())
    }

    /// Every on-board coordinate, ascending row then ascending diagonal
    pub fn all_coordinates(&self) -> Coords {
        Coords {
            size: self.size as i32,
            row: 0,
            diagonal: 0,
        }
    }

    /// Every on-board cell with its coordinate, in `all_coordinates` order
    pub fn cells(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.all_coordinates().zip(self.cells.iter().copied())
    }

    /// Number of discs owned by `player`
    pub fn count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == Cell::Occupied(player))
            .count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    pub fn snapshot(&self) -> BoardSnapshot {
        let discs = self
            .cells()
            .filter_map(|(coord, cell)| cell.owner().map(|player| Disc { coord, player }))
            .collect();
        BoardSnapshot {
            size: self.size,
            discs,
        }
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, GameError> {
        let mut board = Self::empty(snapshot.size)?;
        let mut seen = FxHashSet::default();

        for disc in &snapshot.discs {
            if !board.contains(disc.coord) {
                return Err(GameError::ConfigError(format!(
                    "disc at {} is off a size {} board",
                    disc.coord, snapshot.size
                )));
            }
            if !seen.insert(disc.coord) {
                return Err(GameError::ConfigError(format!(
                    "more than one disc at {}",
                    disc.coord
                )));
            }
            board.set(disc.coord, Cell::Occupied(disc.player))?;
        }
        Ok(board)
    }
}

/// Restartable iterator over the coordinates of a board
#[derive(Clone, Debug)]
pub struct Coords {
    size: i32,
    row: i32,
    diagonal: i32,
}

impl Iterator for Coords {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.row > 2 * (self.size - 1) {
            return None;
        }
        let coord = Coord::new(self.diagonal, self.row);
        let (_, hi) = row_bounds(self.size, self.row);
        if self.diagonal >= hi {
            self.row += 1;
            self.diagonal = row_bounds(self.size, self.row).0;
        } else {
            self.diagonal += 1;
        }
        Some(coord)
    }
}

/// One disc in a [`BoardSnapshot`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disc {
    pub coord: Coord,
    pub player: Player,
}

/// Serializable board contents; empty cells are implied
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: usize,
    pub discs: Vec<Disc>,
}
