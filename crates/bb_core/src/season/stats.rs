//! Season aggregates folded from finished games.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::box_score::{BattingLine, PitchingLine};
use crate::models::player::PlayerId;
use crate::models::{GameResult, TeamId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonBatting {
    pub team_id: TeamId,
    pub games: u32,
    pub total: BattingLine,
    pub vs_left: BattingLine,
    pub vs_right: BattingLine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonPitching {
    pub team_id: TeamId,
    pub line: PitchingLine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub forfeits: u32,
}

impl TeamRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Ties count as half a win.
    pub fn win_pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (f64::from(self.wins) + 0.5 * f64::from(self.ties)) / f64::from(games)
    }

    pub fn run_diff(&self) -> i64 {
        i64::from(self.runs_scored) - i64::from(self.runs_allowed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub batting: BTreeMap<PlayerId, SeasonBatting>,
    pub pitching: BTreeMap<PlayerId, SeasonPitching>,
    pub teams: BTreeMap<TeamId, TeamRecord>,
    pub games: u32,
}

impl SeasonStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, result: &GameResult) {
        self.games += 1;
        for stats in &result.box_score.batting {
            let entry = self.batting.entry(stats.player_id).or_default();
            entry.team_id = stats.team_id;
            entry.games += 1;
            entry.total.add(&stats.total);
            entry.vs_left.add(&stats.vs_left);
            entry.vs_right.add(&stats.vs_right);
        }
        for stats in &result.box_score.pitching {
            let entry = self.pitching.entry(stats.player_id).or_default();
            entry.team_id = stats.team_id;
            entry.line.add(&stats.line);
        }

        let (home, away) = (result.home_team_id, result.away_team_id);
        let winner = result.winner();
        let sides = [
            (home, result.home_score, result.away_score),
            (away, result.away_score, result.home_score),
        ];
        for (team, scored, allowed) in sides {
            let record = self.teams.entry(team).or_default();
            record.runs_scored += scored;
            record.runs_allowed += allowed;
            match winner {
                Some(w) if w == team => record.wins += 1,
                Some(_) => record.losses += 1,
                None => record.ties += 1,
            }
            if result.forfeit.is_some_and(|side| result.team_id(side) == team) {
                record.forfeits += 1;
            }
        }
    }

    /// Teams by win percentage, then run differential, then id.
    pub fn standings(&self) -> Vec<(TeamId, &TeamRecord)> {
        let mut rows: Vec<_> = self.teams.iter().map(|(id, r)| (*id, r)).collect();
        rows.sort_by(|a, b| {
            b.1.win_pct()
                .total_cmp(&a.1.win_pct())
                .then(b.1.run_diff().cmp(&a.1.run_diff()))
                .then(a.0.cmp(&b.0))
        });
        rows
    }

    pub fn summary(&self) -> LeagueSummary {
        let mut batting = BattingLine::default();
        for b in self.batting.values() {
            batting.add(&b.total);
        }
        let mut pitching = PitchingLine::default();
        for p in self.pitching.values() {
            pitching.add(&p.line);
        }
        let pa = f64::from(batting.pa.max(1));
        let team_games: u32 = self.teams.values().map(TeamRecord::games).sum();
        let runs: u32 = self.teams.values().map(|t| t.runs_scored).sum();

        let wins: Vec<f64> = self.teams.values().map(|t| f64::from(t.wins)).collect();
        let win_std_dev = if wins.len() > 1 {
            let mean = wins.iter().sum::<f64>() / wins.len() as f64;
            (wins.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / wins.len() as f64).sqrt()
        } else {
            0.0
        };

        LeagueSummary {
            games: self.games,
            batting_average: batting.batting_average(),
            on_base_pct: batting.on_base_pct(),
            slugging: batting.slugging(),
            era: pitching.era(),
            k_rate: f64::from(batting.strikeouts) / pa,
            bb_rate: f64::from(batting.walks) / pa,
            hr_rate: f64::from(batting.home_runs) / pa,
            runs_per_game: if team_games == 0 {
                0.0
            } else {
                f64::from(runs) / f64::from(team_games)
            },
            win_std_dev,
        }
    }
}

/// League-wide rates; `runs_per_game` is per team game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSummary {
    pub games: u32,
    pub batting_average: f64,
    pub on_base_pct: f64,
    pub slugging: f64,
    pub era: f64,
    pub k_rate: f64,
    pub bb_rate: f64,
    pub hr_rate: f64,
    pub runs_per_game: f64,
    pub win_std_dev: f64,
}
