//! Suggest command - what each strategy would play on a given board

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use hexversi_core::{
    capture_count, legal_moves, Board, BoardSnapshot, Coord, DiscColor, Player, StrategyKind,
};

#[derive(Args)]
pub struct SuggestArgs {
    /// Board snapshot JSON file
    #[arg(value_name = "FILE")]
    pub board: PathBuf,

    /// Player to move (a/black or b/white)
    #[arg(long, default_value = "a")]
    pub player: Player,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One strategy's pick
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Suggestion {
    strategy: StrategyKind,
    coord: Option<Coord>,
    captures: usize,
    legal: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    player: Player,
    color: DiscColor,
    legal_moves: Vec<Coord>,
    suggestions: Vec<Suggestion>,
}

pub fn run(args: SuggestArgs) -> Result<()> {
    let board = load_board(&args.board)?;
    let report = build_report(&board, args.player);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_report(&report);
    }
    Ok(())
}

fn load_board(path: &Path) -> Result<Board> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board: {}", path.display()))?;
    let snapshot: BoardSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse board: {}", path.display()))?;
    Board::from_snapshot(&snapshot).context("Invalid board snapshot")
}

fn build_report(board: &Board, player: Player) -> Report {
    let suggestions = StrategyKind::ALL
        .into_iter()
        .map(|kind| {
            let coord = kind.build().choose(board, player);
            let captures = coord.map_or(0, |c| capture_count(board, c, player));
            Suggestion {
                strategy: kind,
                coord,
                captures,
                legal: captures > 0,
            }
        })
        .collect();

    Report {
        player,
        color: player.color(),
        legal_moves: legal_moves(board, player),
        suggestions,
    }
}

fn print_text_report(report: &Report) {
    println!(
        "{:?} ({:?}) to move, {} legal move(s)",
        report.player,
        report.color,
        report.legal_moves.len()
    );
    for s in &report.suggestions {
        match s.coord {
            Some(coord) if s.legal => {
                println!("  {:<16} {} captures {}", s.strategy, coord, s.captures)
            }
            Some(coord) => println!("  {:<16} {} (not legal, would pass)", s.strategy, coord),
            None => println!("  {:<16} no move", s.strategy),
        }
    }
}
