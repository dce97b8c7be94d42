//! In-game pitcher state machine and bullpen selection.

use serde::{Deserialize, Serialize};

use crate::engine::config::PitchingConfig;
use crate::models::player::{Hand, PitcherAttributes, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitcherStatus {
    Active,
    /// Close to the limit; pulled once trouble starts.
    FatiguedPullCandidate,
    Pulled,
}

/// Snapshot of the current pitcher's outing, checked before each batter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutingSnapshot {
    pub pitches: u32,
    pub batters_faced: u32,
    pub outs_recorded: u32,
    pub entry_inning: u8,
    pub inning: u8,
    pub is_starter: bool,
    pub is_closer: bool,
}

pub fn pitch_limit(attrs: &PitcherAttributes, is_starter: bool, cfg: &PitchingConfig) -> u32 {
    let stamina = f64::from(attrs.stamina);
    let limit = if is_starter {
        cfg.starter_limit_base + cfg.starter_limit_per_stamina * stamina
    } else {
        cfg.reliever_limit_base + cfg.reliever_limit_per_stamina * stamina
    };
    limit.round().max(1.0) as u32
}

/// Innings a starter may complete, `[4, 9]`.
pub fn inning_cap(attrs: &PitcherAttributes, cfg: &PitchingConfig) -> u32 {
    let per = cfg.inning_cap_stamina_per_inning.max(1.0);
    let cap = cfg.inning_cap_base + (f64::from(attrs.stamina) - 300.0) / per;
    cap.floor().clamp(4.0, 9.0) as u32
}

pub fn evaluate_status(
    outing: &OutingSnapshot,
    attrs: &PitcherAttributes,
    cfg: &PitchingConfig,
) -> PitcherStatus {
    let limit = pitch_limit(attrs, outing.is_starter, cfg);
    let late_relief = !outing.is_closer
        && outing.inning >= cfg.late_inning
        && outing.entry_inning < outing.inning;
    if outing.pitches >= limit {
        return PitcherStatus::Pulled;
    }
    if outing.is_starter {
        if outing.outs_recorded >= inning_cap(attrs, cfg) * 3 {
            return PitcherStatus::Pulled;
        }
        if outing.batters_faced >= 9 * cfg.max_times_through_order {
            return PitcherStatus::Pulled;
        }
    } else if late_relief {
        return PitcherStatus::Pulled;
    }
    if f64::from(outing.pitches) >= 0.9 * f64::from(limit) {
        return PitcherStatus::FatiguedPullCandidate;
    }
    PitcherStatus::Active
}

/// Final pull decision: candidates go once a runner reaches base.
pub fn should_pull(status: PitcherStatus, runners_on: bool) -> bool {
    match status {
        PitcherStatus::Pulled => true,
        PitcherStatus::FatiguedPullCandidate => runners_on,
        PitcherStatus::Active => false,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReliefCandidate<'a> {
    pub id: PlayerId,
    pub attrs: &'a PitcherAttributes,
    pub throws: Hand,
    pub is_closer: bool,
    /// Team games since the last appearance (`None` = not used yet).
    pub games_rest: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub struct BullpenSituation {
    pub save_situation: bool,
    /// Batting sides of the next three hitters.
    pub upcoming: [Hand; 3],
    /// Rotates tie-breaks between otherwise equal arms.
    pub cursor: usize,
}

/// Save situation for the fielding team: leading by `1..=save_margin`, or
/// leading with the tying run on base, at bat or on deck.
pub fn is_save_situation(fielding_lead: i32, runners_on: u32, cfg: &PitchingConfig) -> bool {
    let tying_run_close = fielding_lead <= runners_on as i32 + 2;
    fielding_lead >= 1 && (fielding_lead <= cfg.save_margin || tying_run_close)
}

/// Pick a reliever from an already rest-filtered list.
///
/// Preference: closer in a save situation (and not otherwise), platoon
/// matches against the next three hitters, more rest, overall rating.
pub fn select_reliever(
    candidates: &[ReliefCandidate<'_>],
    situation: &BullpenSituation,
) -> Option<PlayerId> {
    if candidates.is_empty() {
        return None;
    }
    let n = candidates.len();
    let start = situation.cursor % n;

    let key = |c: &ReliefCandidate<'_>| {
        let role = if situation.save_situation { c.is_closer } else { !c.is_closer };
        let matches = situation.upcoming.iter().filter(|side| side.same_side(c.throws)).count();
        let rest = c.games_rest.unwrap_or(3).min(3);
        (role, matches, rest, c.attrs.overall_rating())
    };

    let mut best: Option<(usize, &ReliefCandidate<'_>)> = None;
    for offset in 0..n {
        let idx = (start + offset) % n;
        let cand = &candidates[idx];
        let better = match best {
            None => true,
            Some((_, current)) => {
                let (r1, m1, d1, o1) = key(cand);
                let (r2, m2, d2, o2) = key(current);
                (r1, m1, d1).cmp(&(r2, m2, d2)).then(o1.total_cmp(&o2)).is_gt()
            }
        };
        if better {
            best = Some((idx, cand));
        }
    }
    best.map(|(_, c)| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        id: PlayerId,
        attrs: &PitcherAttributes,
        throws: Hand,
        is_closer: bool,
        games_rest: Option<u32>,
    ) -> ReliefCandidate<'_> {
        ReliefCandidate { id, attrs, throws, is_closer, games_rest }
    }

    fn bullpen(save_situation: bool, next: Hand, cursor: usize) -> BullpenSituation {
        BullpenSituation { save_situation, upcoming: [next; 3], cursor }
    }

    fn snapshot() -> OutingSnapshot {
        OutingSnapshot {
            pitches: 40,
            batters_faced: 12,
            outs_recorded: 9,
            entry_inning: 1,
            inning: 4,
            is_starter: true,
            is_closer: false,
        }
    }

    #[test]
    fn test_limits_follow_stamina() {
        let cfg = PitchingConfig::default();
        let mut attrs = PitcherAttributes::league_average();
        assert_eq!(pitch_limit(&attrs, true, &cfg), 103);
        assert_eq!(pitch_limit(&attrs, false, &cfg), 40);
        assert_eq!(inning_cap(&attrs, &cfg), 6);
        attrs.stamina = 550;
        assert_eq!(inning_cap(&attrs, &cfg), 8);
        attrs.stamina = 50;
        assert_eq!(inning_cap(&attrs, &cfg), 4);
    }

    #[test]
    fn test_pull_triggers() {
        let cfg = PitchingConfig::default();
        let attrs = PitcherAttributes::league_average();
        assert_eq!(evaluate_status(&snapshot(), &attrs, &cfg), PitcherStatus::Active);

        let tired = OutingSnapshot { pitches: 110, ..snapshot() };
        assert_eq!(evaluate_status(&tired, &attrs, &cfg), PitcherStatus::Pulled);

        let fourth_time = OutingSnapshot { batters_faced: 27, ..snapshot() };
        assert_eq!(evaluate_status(&fourth_time, &attrs, &cfg), PitcherStatus::Pulled);

        let capped = OutingSnapshot { outs_recorded: 18, ..snapshot() };
        assert_eq!(evaluate_status(&capped, &attrs, &cfg), PitcherStatus::Pulled);

        let near = OutingSnapshot { pitches: 95, ..snapshot() };
        assert_eq!(evaluate_status(&near, &attrs, &cfg), PitcherStatus::FatiguedPullCandidate);
        assert!(!should_pull(PitcherStatus::FatiguedPullCandidate, false));
        assert!(should_pull(PitcherStatus::FatiguedPullCandidate, true));
    }

    #[test]
    fn test_middle_reliever_leaves_in_the_eighth() {
        let cfg = PitchingConfig::default();
        let attrs = PitcherAttributes::league_average();
        let reliever = OutingSnapshot {
            pitches: 14,
            batters_faced: 4,
            outs_recorded: 3,
            entry_inning: 7,
            inning: 8,
            is_starter: false,
            is_closer: false,
        };
        assert_eq!(evaluate_status(&reliever, &attrs, &cfg), PitcherStatus::Pulled);
        let closer = OutingSnapshot { is_closer: true, ..reliever };
        assert_eq!(evaluate_status(&closer, &attrs, &cfg), PitcherStatus::Active);
    }

    #[test]
    fn test_closer_only_in_save_spots() {
        let closer_attrs = PitcherAttributes::uniform(500);
        let setup_attrs = PitcherAttributes::uniform(420);
        let candidates = [
            candidate(1, &setup_attrs, Hand::Right, false, None),
            candidate(2, &closer_attrs, Hand::Right, true, None),
        ];
        let mut situation = bullpen(true, Hand::Right, 0);
        assert_eq!(select_reliever(&candidates, &situation), Some(2));
        situation.save_situation = false;
        assert_eq!(select_reliever(&candidates, &situation), Some(1));
    }

    #[test]
    fn test_platoon_match_beats_rating() {
        let good = PitcherAttributes::uniform(480);
        let ok = PitcherAttributes::uniform(410);
        let candidates = [
            candidate(1, &good, Hand::Right, false, Some(2)),
            candidate(2, &ok, Hand::Left, false, Some(2)),
        ];
        let situation = bullpen(false, Hand::Left, 0);
        assert_eq!(select_reliever(&candidates, &situation), Some(2));
    }

    #[test]
    fn test_cursor_breaks_ties() {
        let attrs = PitcherAttributes::league_average();
        let candidates: Vec<_> =
            (1..=3).map(|id| candidate(id, &attrs, Hand::Right, false, None)).collect();
        let pick = |cursor| select_reliever(&candidates, &bullpen(false, Hand::Left, cursor));
        assert_eq!(pick(0), Some(1));
        assert_eq!(pick(1), Some(2));
        assert_eq!(pick(5), Some(3));
    }

    #[test]
    fn test_save_situation_rules() {
        let cfg = PitchingConfig::default();
        assert!(is_save_situation(3, 0, &cfg));
        assert!(!is_save_situation(4, 0, &cfg));
        assert!(is_save_situation(4, 2, &cfg));
        assert!(!is_save_situation(0, 3, &cfg));
    }
}
