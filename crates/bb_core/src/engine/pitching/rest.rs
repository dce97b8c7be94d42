//! Cross-game pitcher rest tracking.
//!
//! Game indices are per team (the team's n-th game of the season), so rest is
//! counted in team games rather than calendar days.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::config::PitchingConfig;
use crate::models::player::{PitcherAttributes, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitcherRestEntry {
    pub last_game_index: u32,
    pub pitches: u32,
    pub was_start: bool,
    /// Appearances in consecutive team games ending at `last_game_index`.
    pub consecutive_appearances: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitcherRestMap {
    entries: BTreeMap<PlayerId, PitcherRestEntry>,
}

impl PitcherRestMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PitcherRestEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, id: PlayerId, game_index: u32, pitches: u32, was_start: bool) {
        let consecutive_appearances = match self.entries.get(&id) {
            Some(prev) if prev.last_game_index + 1 == game_index => {
                prev.consecutive_appearances + 1
            }
            Some(prev) if prev.last_game_index == game_index => prev.consecutive_appearances,
            _ => 1,
        };
        let entry = PitcherRestEntry {
            last_game_index: game_index,
            pitches,
            was_start,
            consecutive_appearances,
        };
        self.entries.insert(id, entry);
    }

    /// Season rollover.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn high_recovery(attrs: &PitcherAttributes, cfg: &PitchingConfig) -> bool {
        attrs.recovery_rate > cfg.high_recovery_threshold
    }

    /// Team games required between starts.
    pub fn required_starter_gap(attrs: &PitcherAttributes, cfg: &PitchingConfig) -> u32 {
        if Self::high_recovery(attrs, cfg) {
            cfg.starter_rest_games.saturating_sub(cfg.high_recovery_bonus).max(1)
        } else {
            cfg.starter_rest_games.max(1)
        }
    }

    /// Team games since the last appearance, or `None` for a fresh arm.
    pub fn games_since(&self, id: PlayerId, game_index: u32) -> Option<u32> {
        self.entries.get(&id).map(|e| game_index.saturating_sub(e.last_game_index))
    }

    pub fn can_start(
        &self,
        id: PlayerId,
        attrs: &PitcherAttributes,
        game_index: u32,
        cfg: &PitchingConfig,
    ) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            return true;
        };
        let gap = game_index.saturating_sub(entry.last_game_index);
        if entry.was_start {
            gap >= Self::required_starter_gap(attrs, cfg)
        } else if entry.pitches >= cfg.reliever_heavy_pitches {
            gap >= 2
        } else {
            gap >= 1
        }
    }

    pub fn can_relieve(
        &self,
        id: PlayerId,
        attrs: &PitcherAttributes,
        game_index: u32,
        cfg: &PitchingConfig,
    ) -> bool {
        let Some(entry) = self.entries.get(&id) else {
            return true;
        };
        let gap = game_index.saturating_sub(entry.last_game_index);
        if gap == 0 {
            return false;
        }
        if entry.was_start {
            return gap >= 2;
        }
        if gap == 1 && !Self::high_recovery(attrs, cfg) {
            let heavy = entry.pitches >= cfg.reliever_heavy_pitches;
            let overused = entry.consecutive_appearances >= cfg.reliever_max_consecutive;
            return !(heavy || overused);
        }
        true
    }
}
