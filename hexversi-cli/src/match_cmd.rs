//! Match command - play games between two strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use hexversi_core::{
    play_game, random_plies, GameConfig, GameSummary, MachinePlayer, Opening, Outcome, Player,
    StrategyKind, TracingObserver,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Game config JSON file; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Strategy seated as A in odd-numbered games
    #[arg(long)]
    pub first: Option<StrategyKind>,

    /// Strategy seated as A in even-numbered games
    #[arg(long)]
    pub second: Option<StrategyKind>,

    /// Number of games to play (will alternate seats)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Board size (cells along one side)
    #[arg(long)]
    pub size: Option<usize>,

    /// Starting layout: classic, ring or empty
    #[arg(long)]
    pub opening: Option<Opening>,

    /// Maximum turns per game, passes included
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Random legal plies played before the strategies take over
    #[arg(long, default_value = "0")]
    pub random_openings: u32,

    /// Play games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    /// Seat the first strategy played
    first_seat: Player,
    seed: u64,
    summary: GameSummary,
}

impl GameRecord {
    /// Winning side from the match's point of view: `Some(true)` when the
    /// first strategy won
    fn first_won(&self) -> Option<bool> {
        match self.summary.outcome {
            Some(Outcome::Winner(player)) => Some(player == self.first_seat),
            _ => None,
        }
    }
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    first: StrategyKind,
    second: StrategyKind,
    games: Vec<GameRecord>,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
    /// Stalled or cut off by the turn limit
    unfinished: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Build the game config
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args)?;

    tracing::info!(
        "Starting match: {} vs {} ({} games, size {}, {:?} opening)",
        config.player_a,
        config.player_b,
        args.games,
        config.board_size,
        config.opening
    );

    let results = play_match(&config, &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file (or defaults) with command-line overrides applied
fn load_config(args: &MatchArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load game config: {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(size) = args.size {
        config.board_size = size;
    }
    if let Some(opening) = args.opening {
        config.opening = opening;
    }
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    if let Some(first) = args.first {
        config.player_a = first;
    }
    if let Some(second) = args.second {
        config.player_b = second;
    }

    config.validate().context("Invalid match settings")?;
    Ok(config)
}

/// Play all games in the match
fn play_match(config: &GameConfig, args: &MatchArgs, seed: Option<u64>) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let seeds: Vec<u64> = (0..args.games).map(|_| rng.gen()).collect();

    let progress = create_progress(args.games, args.json);
    let play = |(index, &game_seed): (usize, &u64)| {
        let record = play_single_game(config, index + 1, game_seed, args.random_openings);
        progress.inc(1);
        record
    };

    let games: Vec<GameRecord> = if args.parallel {
        seeds
            .par_iter()
            .enumerate()
            .map(play)
            .collect::<Result<_>>()?
    } else {
        seeds.iter().enumerate().map(play).collect::<Result<_>>()?
    };
    progress.finish_and_clear();

    for record in &games {
        tracing::debug!(
            "Game {}: {:?} ({} moves, A={} B={})",
            record.game_number,
            record.summary.outcome,
            record.summary.moves,
            record.summary.scores.a,
            record.summary.scores.b
        );
    }

    Ok(compute_match_statistics(config.player_a, config.player_b, games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game; even-numbered games seat the second strategy as A
fn play_single_game(
    config: &GameConfig,
    game_number: usize,
    seed: u64,
    random_openings: u32,
) -> Result<GameRecord> {
    let swap_seats = game_number % 2 == 0;
    let (kind_a, kind_b) = if swap_seats {
        (config.player_b, config.player_a)
    } else {
        (config.player_a, config.player_b)
    };

    let mut game = config.new_game()?;
    game.add_observer(Box::new(TracingObserver::new(format!("game {}", game_number))));

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_plies(&mut game, random_openings, &mut rng)
        .with_context(|| format!("Random opening failed in game {}", game_number))?;

    let a = MachinePlayer::from_kind(Player::A, kind_a);
    let b = MachinePlayer::from_kind(Player::B, kind_b);
    let summary = play_game(&mut game, &a, &b, config.max_turns)
        .with_context(|| format!("Game {} aborted", game_number))?;

    Ok(GameRecord {
        game_number,
        first_seat: if swap_seats { Player::B } else { Player::A },
        seed,
        summary,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(
    first: StrategyKind,
    second: StrategyKind,
    games: Vec<GameRecord>,
) -> MatchResults {
    let first_wins = games.iter().filter(|g| g.first_won() == Some(true)).count();
    let second_wins = games.iter().filter(|g| g.first_won() == Some(false)).count();
    let draws = games
        .iter()
        .filter(|g| g.summary.outcome == Some(Outcome::Draw))
        .count();
    let unfinished = games.iter().filter(|g| g.summary.outcome.is_none()).count();

    let total_moves: u32 = games.iter().map(|g| g.summary.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        first,
        second,
        games,
        first_wins,
        second_wins,
        draws,
        unfinished,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Progress bar on stderr; hidden when stdout carries JSON
fn create_progress(games: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(games as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} games ({eta})") {
        bar.set_style(style);
    }
    bar
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        first_seat: Player,
        seed: u64,
        #[serde(flatten)]
        summary: GameSummary,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        first: StrategyKind,
        second: StrategyKind,
        total_games: usize,
        first_wins: usize,
        second_wins: usize,
        draws: usize,
        unfinished: usize,
        avg_moves: f32,
        first_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        first: results.first,
        second: results.second,
        total_games: total,
        first_wins: results.first_wins,
        second_wins: results.second_wins,
        draws: results.draws,
        unfinished: results.unfinished,
        avg_moves: results.avg_moves,
        first_win_rate: percent(results.first_wins, total) / 100.0,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                first_seat: g.first_seat,
                seed: g.seed,
                summary: g.summary.clone(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("{} vs {}", results.first, results.second);
    println!("Total games: {}", total);
    println!(
        "{} wins: {} ({:.1}%)",
        results.first,
        results.first_wins,
        percent(results.first_wins, total)
    );
    println!(
        "{} wins: {} ({:.1}%)",
        results.second,
        results.second_wins,
        percent(results.second_wins, total)
    );
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        let result = match game.summary.outcome {
            Some(Outcome::Winner(player)) => format!("{:?} wins", player),
            Some(Outcome::Draw) => "draw".to_string(),
            None if game.summary.stalled => "stalled".to_string(),
            None => "turn limit".to_string(),
        };
        println!(
            "  Game {}: {} {}-{} in {} moves (first strategy as {:?})",
            game.game_number,
            result,
            game.summary.scores.a,
            game.summary.scores.b,
            game.summary.moves,
            game.first_seat
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
