//! Schedule entries, validation and a round-robin generator.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::models::{League, TeamId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub game_id: u64,
    pub date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl ScheduleEntry {
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

/// Unique game ids, known teams, dates in order and no team playing itself.
pub fn validate_schedule(schedule: &[ScheduleEntry], league: &League) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut last_date: Option<NaiveDate> = None;
    for entry in schedule {
        if !seen.insert(entry.game_id) {
            return Err(EngineError::InvalidSchedule(format!(
                "duplicate game id {}",
                entry.game_id
            )));
        }
        if entry.home_team_id == entry.away_team_id {
            return Err(EngineError::InvalidSchedule(format!(
                "game {}: team {} cannot play itself",
                entry.game_id, entry.home_team_id
            )));
        }
        league.team(entry.home_team_id)?;
        league.team(entry.away_team_id)?;
        if last_date.is_some_and(|d| entry.date < d) {
            return Err(EngineError::InvalidSchedule(format!(
                "game {} is out of date order",
                entry.game_id
            )));
        }
        last_date = Some(entry.date);
    }
    Ok(())
}

/// Balanced schedule where every pair meets `rounds` times, home field
/// alternating between rounds. One game day per pairing day; game ids start
/// at 1.
pub fn round_robin(team_ids: &[TeamId], rounds: u32, start: NaiveDate) -> Vec<ScheduleEntry> {
    let mut slots: Vec<Option<TeamId>> = team_ids.iter().copied().map(Some).collect();
    if slots.len() < 2 {
        return Vec::new();
    }
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    let mut schedule = Vec::new();
    let mut game_id = 1u64;
    let mut day = 0u64;

    for round in 0..rounds {
        let mut ring = slots.clone();
        for _ in 0..n - 1 {
            let date = start.checked_add_days(Days::new(day)).unwrap_or(start);
            for i in 0..n / 2 {
                let (a, b) = (ring[i], ring[n - 1 - i]);
                let (Some(a), Some(b)) = (a, b) else {
                    continue;
                };
                // Alternate who hosts by round and by pairing index.
                let (home, away) = if (round + i as u32) % 2 == 0 { (a, b) } else { (b, a) };
                let entry = ScheduleEntry { game_id, date, home_team_id: home, away_team_id: away };
                schedule.push(entry);
                game_id += 1;
            }
            // Circle method: first slot fixed, the rest rotate.
            if let Some(last) = ring.pop() {
                ring.insert(1, last);
            }
            day += 1;
        }
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::league_builder::demo_league;
    use std::collections::BTreeMap;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 28).unwrap()
    }

    #[test]
    fn test_round_robin_balance() {
        let teams = [1, 2, 3, 4, 5, 6];
        let schedule = round_robin(&teams, 2, start());
        assert_eq!(schedule.len(), 2 * 15);

        let mut games: BTreeMap<TeamId, u32> = BTreeMap::new();
        for e in &schedule {
            *games.entry(e.home_team_id).or_default() += 1;
            *games.entry(e.away_team_id).or_default() += 1;
        }
        assert!(games.values().all(|g| *g == 10));

        // A team never plays twice on one date.
        for e in &schedule {
            let same_day =
                schedule.iter().filter(|o| o.date == e.date && o.involves(e.home_team_id)).count();
            assert_eq!(same_day, 1);
        }
    }

    #[test]
    fn test_odd_team_count_gets_byes() {
        let schedule = round_robin(&[1, 2, 3], 1, start());
        assert_eq!(schedule.len(), 3);
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let league = demo_league(2, 1);
        let good = round_robin(&[1, 2], 3, start());
        assert!(validate_schedule(&good, &league).is_ok());

        let mut dup = good.clone();
        dup[1].game_id = dup[0].game_id;
        assert!(matches!(validate_schedule(&dup, &league), Err(EngineError::InvalidSchedule(_))));

        let mut unknown = good.clone();
        unknown[0].away_team_id = 99;
        assert!(matches!(validate_schedule(&unknown, &league), Err(EngineError::UnknownTeam(99))));
    }
}
