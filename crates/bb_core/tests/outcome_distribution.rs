//! Statistical checks over full seasons with fixed seeds.

use bb_core::engine::config::EngineConfig;
use bb_core::models::{BattingLine, Hand, PlayerRole, TeamId};
use bb_core::season::{round_robin, simulate_season, SeasonResult};
use bb_core::{build_league, DemoLeagueOptions, League};
use chrono::NaiveDate;

fn average_league(teams: u32, seed: u64) -> League {
    build_league(&DemoLeagueOptions { teams, seed, attribute_mean: 400.0, attribute_sd: 0.0 })
}

fn run(league: &League, config: &EngineConfig, rounds: u32, seed: u64) -> SeasonResult {
    let ids: Vec<TeamId> = league.teams.iter().map(|t| t.id).collect();
    let schedule = round_robin(&ids, rounds, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    simulate_season(league, config, schedule, seed).unwrap()
}

fn rate(n: u32, d: u32) -> f64 {
    f64::from(n) / f64::from(d.max(1))
}

#[test]
fn test_average_rosters_give_plausible_rates() {
    let league = average_league(8, 11);
    let result = run(&league, &EngineConfig::default(), 6, 2024);

    let mut total = BattingLine::default();
    for b in result.stats.batting.values() {
        total.add(&b.total);
    }
    assert!(total.pa >= 10_000, "only {} plate appearances", total.pa);

    let k = rate(total.strikeouts, total.pa);
    let bb = rate(total.walks, total.pa);
    let hr = rate(total.home_runs, total.pa);
    let hbp = rate(total.hit_by_pitch, total.pa);
    assert!((0.18..=0.30).contains(&k), "k rate {}", k);
    assert!((0.06..=0.13).contains(&bb), "bb rate {}", bb);
    assert!((0.025..=0.07).contains(&hr), "hr rate {}", hr);
    assert!((0.003..=0.025).contains(&hbp), "hbp rate {}", hbp);
    assert!(total.singles > total.doubles);
    assert!(total.doubles > total.triples);

    let summary = result.summary;
    assert!((0.20..0.30).contains(&summary.batting_average), "avg {}", summary.batting_average);
    assert!((2.5..7.0).contains(&summary.runs_per_game), "r/g {}", summary.runs_per_game);
}

#[test]
fn test_elite_stuff_strikes_out_average_hitters() {
    let mut league = average_league(2, 5);
    for p in league.players.values_mut().filter(|p| p.team_id == 1) {
        if let PlayerRole::Pitcher(attrs) = &mut p.attributes {
            attrs.stuff = 520;
        }
    }
    let result = run(&league, &EngineConfig::deterministic_tactics(), 140, 9);

    let mut facing_elite = BattingLine::default();
    for b in result.stats.batting.values().filter(|b| b.team_id == 2) {
        facing_elite.add(&b.total);
    }
    assert!(facing_elite.pa >= 5_000, "only {} plate appearances", facing_elite.pa);
    let k = rate(facing_elite.strikeouts, facing_elite.pa);
    assert!(k > 0.28, "k rate {}", k);
}

#[test]
fn test_left_handed_hitters_keep_their_bat_against_righties() {
    let league = average_league(8, 23);
    let result = run(&league, &EngineConfig::default(), 6, 7);

    let (mut vs_left, mut vs_right) = (BattingLine::default(), BattingLine::default());
    for (id, b) in &result.stats.batting {
        if league.players[id].bats == Hand::Left {
            vs_left.add(&b.vs_left);
            vs_right.add(&b.vs_right);
        }
    }
    assert!(vs_left.pa >= 300, "only {} PA against lefties", vs_left.pa);
    let against_left = rate(vs_left.hits, vs_left.pa);
    let against_right = rate(vs_right.hits, vs_right.pa);
    assert!(against_right >= 0.9 * against_left, "vs R {} vs L {}", against_right, against_left);
}
