//! Game state, turn arbitration and observer dispatch

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord};
use crate::capture;
use crate::config::GameConfig;
use crate::error::GameError;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player identity. A moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

/// Disc colour bound to each player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscColor {
    Black,
    White,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::A, Player::B];

    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    pub fn color(self) -> DiscColor {
        match self {
            Player::A => DiscColor::Black,
            Player::B => DiscColor::White,
        }
    }
}

impl FromStr for Player {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "black" => Ok(Player::A),
            "b" | "white" => Ok(Player::B),
            other => Err(GameError::ConfigError(format!("unknown player: {}", other))),
        }
    }
}

/// Disc counts for both players
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub a: usize,
    pub b: usize,
}

impl Scores {
    pub fn of(board: &Board) -> Self {
        Self {
            a: board.count(Player::A),
            b: board.count(Player::B),
        }
    }

    pub fn get(&self, player: Player) -> usize {
        match player {
            Player::A => self.a,
            Player::B => self.b,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b
    }

    pub fn outcome(&self) -> Outcome {
        match self.a.cmp(&self.b) {
            std::cmp::Ordering::Greater => Outcome::Winner(Player::A),
            std::cmp::Ordering::Less => Outcome::Winner(Player::B),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// Final result of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Winner(Player),
    Draw,
}

/// Lifecycle of a game. `GameOver` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    InProgress,
    GameOver,
}

// ============================================================================
// OBSERVERS
// ============================================================================

/// Receives game events synchronously, before the triggering call returns.
pub trait GameObserver {
    fn on_turn_changed(&mut self, current: Player);

    fn on_refresh(&mut self) {}

    fn on_game_over(&mut self, scores: Scores);
}

/// Observer that reports every event through `tracing`
#[derive(Clone, Debug, Default)]
pub struct TracingObserver {
    pub label: String,
}

impl TracingObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl GameObserver for TracingObserver {
    fn on_turn_changed(&mut self, current: Player) {
        tracing::debug!(game = %self.label, "turn: {:?} ({:?})", current, current.color());
    }

    fn on_refresh(&mut self) {
        tracing::trace!(game = %self.label, "board changed");
    }

    fn on_game_over(&mut self, scores: Scores) {
        tracing::info!(
            game = %self.label,
            "game over: A={} B={} ({:?})",
            scores.a,
            scores.b,
            scores.outcome()
        );
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

pub struct GameState {
    board: Board,
    current_player: Player,
    phase: Phase,
    /// Notified in registration order
    observers: Vec<Box<dyn GameObserver>>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("board", &self.board)
            .field("current_player", &self.current_player)
            .field("phase", &self.phase)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(board: Board) -> Self {
        Self {
            board,
            current_player: Player::A,
            phase: Phase::NotStarted,
            observers: Vec::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::with_opening(config.board_size, config.opening)?;
        Ok(Self::new(board))
    }

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Winner or draw, once the game is over
    pub fn outcome(&self) -> Option<Outcome> {
        self.is_finished().then(|| Scores::of(&self.board).outcome())
    }

    // ========================================================================
    // TURN FLOW
    // ========================================================================

    /// Begin play with A to move
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        self.phase = Phase::InProgress;
        self.current_player = Player::A;
        tracing::debug!(size = self.board.size(), "game started");
        self.announce_turn();
        Ok(())
    }

    /// Place a disc for `player` at `coord`.
    ///
    /// Returns the flipped coordinates. A rejected move leaves the board as
    /// it was.
    pub fn make_move(&mut self, player: Player, coord: Coord) -> Result<Vec<Coord>, GameError> {
        self.ensure_playing()?;
        if player != self.current_player {
            return Err(GameError::WrongPlayer {
                expected: self.current_player,
                actual: player,
            });
        }

        let flipped = capture::place(&mut self.board, coord, player)?;
        tracing::debug!("{:?} plays {} flipping {}", player, coord, flipped.len());

        self.notify(|o| o.on_refresh());
        self.next_player(player)?;
        Ok(flipped)
    }

    /// Explicitly give up the turn
    pub fn pass(&mut self, player: Player) -> Result<(), GameError> {
        self.ensure_playing()?;
        if player != self.current_player {
            return Err(GameError::WrongPlayer {
                expected: self.current_player,
                actual: player,
            });
        }
        tracing::debug!("{:?} passes", player);
        self.next_player(player)
    }

    /// Hand the turn to `who`'s opponent.
    ///
    /// Stuck players are not skipped here; drivers pass explicitly. If
    /// neither side can move afterwards the game ends.
    pub fn next_player(&mut self, who: Player) -> Result<(), GameError> {
        self.ensure_playing()?;
        self.current_player = who.opponent();
        self.announce_turn();
        Ok(())
    }

    /// True when neither player has a capturing move on any empty cell
    pub fn game_over(&self) -> Result<bool, GameError> {
        if !self.is_started() {
            return Err(GameError::NotStarted);
        }
        Ok(self.position_is_terminal())
    }

    pub fn score(&self, player: Player) -> Result<usize, GameError> {
        if !self.is_started() {
            return Err(GameError::NotStarted);
        }
        Ok(self.board.count(player))
    }

    pub fn scores(&self) -> Result<Scores, GameError> {
        if !self.is_started() {
            return Err(GameError::NotStarted);
        }
        Ok(Scores::of(&self.board))
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::NotStarted => Err(GameError::NotStarted),
            Phase::GameOver => Err(GameError::GameFinished),
            Phase::InProgress => Ok(()),
        }
    }

    fn position_is_terminal(&self) -> bool {
        Player::ALL
            .iter()
            .all(|&player| !capture::has_legal_move(&self.board, player))
    }

    /// Tell observers whose turn it is, then close the game if nobody can move
    fn announce_turn(&mut self) {
        let current = self.current_player;
        self.notify(|o| o.on_turn_changed(current));

        if self.position_is_terminal() {
            self.phase = Phase::GameOver;
            let scores = Scores::of(&self.board);
            tracing::debug!("no moves left: A={} B={}", scores.a, scores.b);
            self.notify(|o| o.on_game_over(scores));
        }
    }

    fn notify(&mut self, mut event: impl FnMut(&mut dyn GameObserver)) {
        for observer in self.observers.iter_mut() {
            event(observer.as_mut());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Opening};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Event {
        Turn(Player),
        Refresh,
        Over(Scores),
    }

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<(&'static str, Event)>>>,
    }

    impl GameObserver for Recorder {
        fn on_turn_changed(&mut self, current: Player) {
            self.log.borrow_mut().push((self.tag, Event::Turn(current)));
        }

        fn on_refresh(&mut self) {
            self.log.borrow_mut().push((self.tag, Event::Refresh));
        }

        fn on_game_over(&mut self, scores: Scores) {
            self.log.borrow_mut().push((self.tag, Event::Over(scores)));
        }
    }

    fn recorded_game(board: Board) -> (GameState, Rc<RefCell<Vec<(&'static str, Event)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut game = GameState::new(board);
        game.add_observer(Box::new(Recorder { tag: "x", log: log.clone() }));
        (game, log)
    }

    fn events(log: &Rc<RefCell<Vec<(&'static str, Event)>>>) -> Vec<Event> {
        log.borrow().iter().map(|(_, e)| e.clone()).collect()
    }

    #[test]
    fn test_game_creation() {
        let game = GameState::new(Board::new(3).unwrap());
        assert_eq!(game.phase(), Phase::NotStarted);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn test_start_notifies_turn() {
        let (mut game, log) = recorded_game(Board::new(3).unwrap());
        game.start().unwrap();
        assert_eq!(game.phase(), Phase::InProgress);
        assert_eq!(events(&log), vec![Event::Turn(Player::A)]);
        assert_eq!(game.start(), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_queries_before_start() {
        let mut game = GameState::new(Board::new(2).unwrap());
        assert_eq!(game.game_over(), Err(GameError::NotStarted));
        assert_eq!(game.score(Player::A), Err(GameError::NotStarted));
        assert_eq!(
            game.make_move(Player::A, Coord::new(0, 1)),
            Err(GameError::NotStarted)
        );
        assert_eq!(game.pass(Player::A), Err(GameError::NotStarted));
        assert_eq!(game.next_player(Player::A), Err(GameError::NotStarted));
    }

    #[test]
    fn test_opening_move_flips_one_disc() {
        let (mut game, log) = recorded_game(Board::new(2).unwrap());
        game.start().unwrap();

        let flipped = game.make_move(Player::A, Coord::new(0, 1)).unwrap();
        assert_eq!(flipped, vec![Coord::new(1, 1)]);
        assert_eq!(game.board().cell_at(Coord::new(1, 1)), Cell::Occupied(Player::A));
        assert_eq!(game.current_player(), Player::B);
        assert_eq!(game.score(Player::A), Ok(4));
        assert_eq!(game.score(Player::B), Ok(1));
        assert_eq!(
            events(&log),
            vec![Event::Turn(Player::A), Event::Refresh, Event::Turn(Player::B)]
        );
    }

    #[test]
    fn test_wrong_player() {
        let mut game = GameState::new(Board::new(2).unwrap());
        game.start().unwrap();
        assert_eq!(
            game.make_move(Player::B, Coord::new(0, 1)),
            Err(GameError::WrongPlayer {
                expected: Player::A,
                actual: Player::B,
            })
        );
        assert_eq!(game.current_player(), Player::A);
    }

    #[test]
    fn test_occupied_target_leaves_board_unchanged() {
        let mut game = GameState::new(Board::new(2).unwrap());
        game.start().unwrap();
        let before = game.board().clone();

        assert_eq!(
            game.make_move(Player::A, Coord::new(1, 0)),
            Err(GameError::OccupiedTarget(Coord::new(1, 0)))
        );
        assert_eq!(game.board(), &before);
        assert_eq!(game.current_player(), Player::A);
    }

    #[test]
    fn test_illegal_and_off_board_moves() {
        let mut game = GameState::new(Board::new(2).unwrap());
        game.start().unwrap();
        let before = game.board().clone();

        assert_eq!(
            game.make_move(Player::A, Coord::new(1, 2)),
            Err(GameError::IllegalMove(Coord::new(1, 2)))
        );
        assert_eq!(
            game.make_move(Player::A, Coord::new(3, 0)),
            Err(GameError::InvalidTarget(Coord::new(3, 0)))
        );
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_full_game_on_smallest_board() {
        let (mut game, log) = recorded_game(Board::new(2).unwrap());
        game.start().unwrap();

        game.make_move(Player::A, Coord::new(0, 1)).unwrap();
        assert_eq!(game.game_over(), Ok(false));
        game.make_move(Player::B, Coord::new(1, 2)).unwrap();
        assert_eq!(game.game_over(), Ok(false));
        game.make_move(Player::A, Coord::new(2, 2)).unwrap();

        assert!(game.is_finished());
        assert_eq!(game.game_over(), Ok(true));
        assert_eq!(game.game_over(), Ok(true));
        assert_eq!(game.scores(), Ok(Scores { a: 5, b: 2 }));
        assert_eq!(game.outcome(), Some(Outcome::Winner(Player::A)));

        let log = events(&log);
        assert_eq!(log.len(), 8);
        assert_eq!(log[6], Event::Turn(Player::B));
        assert_eq!(log[7], Event::Over(Scores { a: 5, b: 2 }));

        assert_eq!(
            game.make_move(Player::B, Coord::new(0, 0)),
            Err(GameError::GameFinished)
        );
    }

    #[test]
    fn test_pass_hands_over_turn() {
        let (mut game, log) = recorded_game(Board::new(3).unwrap());
        game.start().unwrap();

        assert_eq!(
            game.pass(Player::B),
            Err(GameError::WrongPlayer {
                expected: Player::A,
                actual: Player::B,
            })
        );
        game.pass(Player::A).unwrap();
        assert_eq!(game.current_player(), Player::B);
        assert_eq!(
            events(&log),
            vec![Event::Turn(Player::A), Event::Turn(Player::B)]
        );
    }

    #[test]
    fn test_observers_notified_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut game = GameState::new(Board::new(3).unwrap());
        game.add_observer(Box::new(Recorder { tag: "first", log: log.clone() }));
        game.add_observer(Box::new(Recorder { tag: "second", log: log.clone() }));
        game.start().unwrap();

        let tags: Vec<_> = log.borrow().iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, vec!["first", "second"]);
    }

    #[test]
    fn test_terminal_opening_ends_at_start() {
        // Six discs around the centre and nothing capturable
        let (mut game, log) = recorded_game(Board::with_opening(2, Opening::Ring).unwrap());
        game.start().unwrap();
        assert!(game.is_finished());
        assert_eq!(game.outcome(), Some(Outcome::Draw));
        assert_eq!(
            events(&log),
            vec![Event::Turn(Player::A), Event::Over(Scores { a: 3, b: 3 })]
        );
    }

    #[test]
    fn test_player_from_str() {
        assert_eq!("a".parse::<Player>().unwrap(), Player::A);
        assert_eq!("White".parse::<Player>().unwrap(), Player::B);
        assert!("c".parse::<Player>().is_err());
        assert_eq!(Player::A.color(), DiscColor::Black);
    }
}
