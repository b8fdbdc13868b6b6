//! Game configuration loaded from JSON

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::ai::MachinePlayer;
use crate::board::{check_size, Opening};
use crate::error::GameError;
use crate::game::{GameState, Player};
use crate::strategy::StrategyKind;

/// Everything needed to set up a machine-vs-machine game.
///
/// Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub opening: Opening,
    pub player_a: StrategyKind,
    pub player_b: StrategyKind,
    /// Turn cap for driven games, passes included
    pub max_turns: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 6,
            opening: Opening::Classic,
            player_a: StrategyKind::CaptureMax,
            player_b: StrategyKind::Minimax,
            max_turns: 500,
        }
    }
}

impl GameConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GameError> {
        check_size(self.board_size)?;
        if self.max_turns == 0 {
            return Err(GameError::ConfigError(
                "max_turns must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn strategy_for(&self, player: Player) -> StrategyKind {
        match player {
            Player::A => self.player_a,
            Player::B => self.player_b,
        }
    }

    /// Fresh, unstarted game for this configuration
    pub fn new_game(&self) -> Result<GameState, GameError> {
        GameState::from_config(self)
    }

    /// Machine players for seats A and B
    pub fn machine_players(&self) -> (MachinePlayer, MachinePlayer) {
        (
            MachinePlayer::from_kind(Player::A, self.player_a),
            MachinePlayer::from_kind(Player::B, self.player_b),
        )
    }
}
