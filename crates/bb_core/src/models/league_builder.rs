//! Seeded demo leagues for tests, benchmarks and the CLI `demo` command.
//!
//! Every team gets nine starters (one per fielding position plus a DH),
//! four bench bats, five starters, seven relievers and a closer. Attributes
//! are drawn around league average, so the same seed always yields the same
//! league.

use std::collections::BTreeMap;

use super::park::ParkFactors;
use super::player::{
    Hand, HitterAttributes, PitchMix, PitcherAttributes, Player, PlayerId, PlayerRole, Position,
    RosterStatus,
};
use super::team::{League, Team, TeamId};
use crate::engine::rng::Generator;

const LINEUP_POSITIONS: [Position; 9] = [
    Position::C,
    Position::FirstBase,
    Position::SecondBase,
    Position::ThirdBase,
    Position::SS,
    Position::LF,
    Position::CF,
    Position::RF,
    Position::DH,
];

const BENCH_POSITIONS: [Position; 4] =
    [Position::C, Position::SS, Position::CF, Position::FirstBase];

const CITY_NAMES: [&str; 30] = [
    "Harbor City", "Red Mesa", "Port Alder", "Granite Falls", "Lakeshore", "Cedar Bluff",
    "Iron Valley", "Summit", "Bayview", "Prairie Rock", "Northgate", "Silver Creek",
    "Riverton", "Stonebridge", "Westfield", "Pine Hollow", "Eastport", "Copper Hill",
    "Marble Bay", "Oak Ridge", "Sandpoint", "Highbury", "Fox Run", "Clearwater",
    "Ashford", "Kingsport", "Maple Grove", "Dunmore", "Bright Harbor", "Cold Spring",
];

/// Talent knobs for generated players.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoLeagueOptions {
    pub teams: u32,
    pub seed: u64,
    pub attribute_mean: f64,
    pub attribute_sd: f64,
}

impl Default for DemoLeagueOptions {
    fn default() -> Self {
        Self { teams: 30, seed: 2024, attribute_mean: 400.0, attribute_sd: 45.0 }
    }
}

/// Demo league with `teams` clubs and default talent spread.
pub fn demo_league(teams: u32, seed: u64) -> League {
    build_league(&DemoLeagueOptions { teams, seed, ..DemoLeagueOptions::default() })
}

pub fn build_league(options: &DemoLeagueOptions) -> League {
    let mut gen = Generator::create(options.seed);
    let mut league = League { teams: Vec::new(), players: BTreeMap::new(), parks: BTreeMap::new() };

    for team_id in 1..=options.teams {
        let park_id = format!("PARK{:02}", team_id);
        let (park, next) = generate_park(&park_id, gen);
        gen = next;
        let city = CITY_NAMES[(team_id as usize - 1) % CITY_NAMES.len()];
        let park = ParkFactors { name: format!("{} Park", city), ..park };
        league.parks.insert(park_id.clone(), park);
        let team = Team { id: team_id, name: city.to_string(), park_id, batting_order: None };
        league.teams.push(team);

        gen = fill_roster(&mut league.players, team_id, options, gen);
    }
    league
}

fn fill_roster(
    players: &mut BTreeMap<PlayerId, Player>,
    team_id: TeamId,
    options: &DemoLeagueOptions,
    gen: Generator,
) -> Generator {
    let mut gen = gen;
    let mut next_id = team_id * 100;
    let sd = options.attribute_sd;
    for (k, position) in LINEUP_POSITIONS.iter().chain(BENCH_POSITIONS.iter()).enumerate() {
        // Bench players sit a step below the starters.
        let mean = if k < 9 { options.attribute_mean } else { options.attribute_mean - 25.0 };
        let (player, next) = generate_hitter(next_id, team_id, *position, mean, sd, gen);
        gen = next;
        players.insert(player.id, player);
        next_id += 1;
    }

    let staff = std::iter::repeat(Position::SP)
        .take(5)
        .chain(std::iter::repeat(Position::RP).take(7))
        .chain(std::iter::once(Position::CL));
    for position in staff {
        let mean = options.attribute_mean;
        let (player, next) = generate_pitcher(next_id, team_id, position, mean, sd, gen);
        gen = next;
        players.insert(player.id, player);
        next_id += 1;
    }
    gen
}

fn attribute(mean: f64, sd: f64, gen: Generator) -> (u16, Generator) {
    let (v, gen) = gen.clamped_gaussian(mean, sd, 150.0, 550.0);
    (v.round() as u16, gen)
}

fn draw_attributes<const N: usize>(mean: f64, sd: f64, gen: Generator) -> ([u16; N], Generator) {
    let mut out = [0u16; N];
    let mut gen = gen;
    for slot in out.iter_mut() {
        let (v, next) = attribute(mean, sd, gen);
        *slot = v;
        gen = next;
    }
    (out, gen)
}

fn generate_hitter(
    id: PlayerId,
    team_id: TeamId,
    position: Position,
    mean: f64,
    sd: f64,
    gen: Generator,
) -> (Player, Generator) {
    let (a, gen) = draw_attributes::<13>(mean, sd, gen);
    let (hand_roll, gen) = gen.choose_weighted(&[0.60, 0.30, 0.10]);
    let (throw_roll, gen) = gen.chance(0.80);
    let (age, gen) = gen.int_range(21, 37);
    let bats = [Hand::Right, Hand::Left, Hand::Switch][hand_roll];

    // Premium defensive spots trade some bat for glove.
    let premium = matches!(position, Position::C | Position::SS | Position::CF);
    let glove_bonus = if premium { 40 } else { 0 };
    let attrs = HitterAttributes {
        contact: a[0],
        power: a[1],
        eye: a[2],
        speed: a[3],
        baserunning_iq: a[4],
        fielding: (a[5] + glove_bonus).min(550),
        arm_strength: a[6],
        durability: a[7],
        platoon_sensitivity: a[8],
        offensive_iq: a[9],
        defensive_iq: a[10],
        mental_toughness: a[11],
        work_ethic: a[12],
    };
    let player = Player {
        id,
        name: format!("Hitter {}", id),
        age: age as u8,
        bats,
        throws: if throw_roll { Hand::Right } else { Hand::Left },
        position,
        team_id,
        status: RosterStatus::Active,
        attributes: PlayerRole::Hitter(attrs),
    };
    (player, gen)
}

fn generate_pitcher(
    id: PlayerId,
    team_id: TeamId,
    position: Position,
    mean: f64,
    sd: f64,
    gen: Generator,
) -> (Player, Generator) {
    let (a, gen) = draw_attributes::<12>(mean, sd, gen);
    let (lefty, gen) = gen.chance(0.28);
    let (arsenal, gen) = gen.int_range(2, 6);
    let (fastball, gen) = gen.float_range(0.45, 0.65);
    let (breaking, gen) = gen.float_range(0.2, 0.35);
    let (age, gen) = gen.int_range(22, 38);

    let stamina = match position {
        Position::SP => (a[3] + 60).min(550),
        _ => a[3].saturating_sub(120).max(150),
    };
    let stuff = if position == Position::CL { (a[0] + 50).min(550) } else { a[0] };
    let offspeed = (1.0 - fastball - breaking).max(0.05);
    let pitch_mix = PitchMix { fastball, breaking, offspeed }.normalized();
    let attrs = PitcherAttributes {
        stuff,
        movement: a[1],
        command: a[2],
        stamina,
        arsenal_size: arsenal as u8,
        groundball_tendency: a[4],
        hold_runners: a[5],
        durability: a[6],
        recovery_rate: a[7],
        platoon_tendency: a[8],
        pitch_mix,
        pitching_iq: a[9],
        mental_toughness: a[10],
        work_ethic: a[11],
    };
    let throws = if lefty { Hand::Left } else { Hand::Right };
    let player = Player {
        id,
        name: format!("Pitcher {}", id),
        age: age as u8,
        bats: throws,
        throws,
        position,
        team_id,
        status: RosterStatus::Active,
        attributes: PlayerRole::Pitcher(attrs),
    };
    (player, gen)
}

fn generate_park(id: &str, gen: Generator) -> (ParkFactors, Generator) {
    let (hr, gen) = gen.clamped_gaussian(1.0, 0.08, 0.8, 1.25);
    let (babip, gen) = gen.clamped_gaussian(1.0, 0.03, 0.92, 1.08);
    let (doubles, gen) = gen.clamped_gaussian(1.0, 0.05, 0.88, 1.15);
    let (triples, gen) = gen.clamped_gaussian(1.0, 0.15, 0.6, 1.5);
    let (k, gen) = gen.clamped_gaussian(1.0, 0.03, 0.92, 1.08);
    let (elevation, gen) = gen.float_range(0.0, 1200.0);
    let (roof, gen) = gen.chance(0.2);
    let (climate, gen) = gen.float_range(62.0, 84.0);
    let park = ParkFactors {
        hr_factor: hr,
        babip_factor: babip,
        double_factor: doubles,
        triple_factor: triples,
        k_factor: k,
        elevation_ft: elevation,
        has_roof: roof,
        climate_temp_f: climate,
        ..ParkFactors::neutral(id)
    };
    (park, gen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_roster_shape() {
        let league = demo_league(4, 7);
        assert_eq!(league.teams.len(), 4);
        assert_eq!(league.parks.len(), 4);
        for team in &league.teams {
            let roster: Vec<_> = league.players.values().filter(|p| p.team_id == team.id).collect();
            assert_eq!(roster.len(), 26);
            assert_eq!(roster.iter().filter(|p| p.is_eligible_hitter()).count(), 13);
            assert_eq!(roster.iter().filter(|p| p.position == Position::SP).count(), 5);
            assert_eq!(roster.iter().filter(|p| p.position == Position::CL).count(), 1);
        }
    }

    #[test]
    fn test_demo_league_is_seeded() {
        assert_eq!(demo_league(3, 11), demo_league(3, 11));
        assert_ne!(demo_league(3, 11), demo_league(3, 12));
    }

    #[test]
    fn test_attributes_in_range() {
        let league = demo_league(2, 99);
        for p in league.players.values() {
            if let Some(h) = p.hitter() {
                assert!((150..=550).contains(&h.contact));
                assert!((150..=550).contains(&h.fielding));
            }
            if let Some(pa) = p.pitcher() {
                assert!((2..=6).contains(&pa.arsenal_size));
                assert!((150..=550).contains(&pa.stamina));
            }
        }
    }
}
