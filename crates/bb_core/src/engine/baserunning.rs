//! Base-out state machine.
//!
//! Runner occupancy is a three-bit mask (bit 0 = first, bit 1 = second,
//! bit 2 = third). Every transition is a pure function of the current state,
//! the outcome, runner speeds and (for contested advances) the generator.
//! A transition that reaches the third out scores no runs. The state also
//! carries the half-inning's running run total.

use serde::{Deserialize, Serialize};

use crate::engine::plate_appearance::PaOutcome;
use crate::engine::rng::Generator;

pub const FIRST: u8 = 0b001;
pub const SECOND: u8 = 0b010;
pub const THIRD: u8 = 0b100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MarkovState {
    pub runners: u8,
    pub outs: u8,
    /// Runs scored so far in the half-inning.
    #[serde(default)]
    pub runs_scored: u32,
}

impl MarkovState {
    pub fn new(runners: u8, outs: u8) -> Self {
        Self { runners: runners & 0b111, outs: outs.min(3), runs_scored: 0 }
    }

    pub fn with_runs(self, runs_scored: u32) -> Self {
        Self { runs_scored, ..self }
    }

    pub fn is_occupied(&self, base: u8) -> bool {
        base >= 1 && base <= 3 && self.runners & (1 << (base - 1)) != 0
    }

    pub fn runner_count(&self) -> u32 {
        (self.runners & 0b111).count_ones()
    }

    pub fn inning_over(&self) -> bool {
        self.outs >= 3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedTier {
    Slow,
    Average,
    Fast,
}

impl SpeedTier {
    pub fn from_speed(speed: u16) -> Self {
        if speed < 200 {
            SpeedTier::Slow
        } else if speed < 400 {
            SpeedTier::Average
        } else {
            SpeedTier::Fast
        }
    }

    fn pick(self, table: [f64; 3]) -> f64 {
        match self {
            SpeedTier::Slow => table[0],
            SpeedTier::Average => table[1],
            SpeedTier::Fast => table[2],
        }
    }
}

/// Speed of the batter and of whoever is on each base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseSpeeds {
    pub batter: u16,
    /// Indexed by base - 1.
    pub runners: [Option<u16>; 3],
}

impl BaseSpeeds {
    fn tier(&self, base: u8) -> SpeedTier {
        self.runners[usize::from(base - 1)].map(SpeedTier::from_speed).unwrap_or(SpeedTier::Average)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Base(u8),
    Scored,
    Out,
    /// Left on base when the inning ended on the play.
    Stranded,
}

/// Result of one state transition.
///
/// `moves[0]` is the batter (`None` when the batter is not involved, e.g. a
/// steal); `moves[1..=3]` are the runners that started on first to third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: MarkovState,
    pub runs: u32,
    pub outs_added: u8,
    pub moves: [Option<Destination>; 4],
}

impl Transition {
    pub fn scorers(&self) -> impl Iterator<Item = usize> + '_ {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| matches!(m, Some(Destination::Scored)))
            .map(|(i, _)| i)
    }
}

/// Collects moves and folds them into a transition.
struct Play {
    before: MarkovState,
    moves: [Option<Destination>; 4],
}

impl Play {
    fn new(before: MarkovState) -> Self {
        let mut moves = [None; 4];
        for base in 1..=3u8 {
            if before.is_occupied(base) {
                moves[usize::from(base)] = Some(Destination::Base(base));
            }
        }
        Self { before, moves }
    }

    fn has(&self, base: u8) -> bool {
        self.before.is_occupied(base)
    }

    fn set(&mut self, slot: u8, dest: Destination) {
        self.moves[usize::from(slot)] = Some(dest);
    }

    fn batter(&mut self, dest: Destination) {
        self.moves[0] = Some(dest);
    }

    /// True when some runner (or the batter) is already headed to `base`.
    fn claimed(&self, base: u8) -> bool {
        self.moves.iter().any(|m| *m == Some(Destination::Base(base)))
    }

    fn advance(base: u8, by: u8) -> Destination {
        if base + by > 3 {
            Destination::Scored
        } else {
            Destination::Base(base + by)
        }
    }

    fn finish(self) -> Transition {
        let outs_added =
            self.moves.iter().filter(|m| matches!(m, Some(Destination::Out))).count() as u8;
        let outs = self.before.outs.saturating_add(outs_added).min(3);
        let mut moves = self.moves;

        if outs >= 3 {
            for m in moves.iter_mut() {
                if matches!(m, Some(Destination::Scored) | Some(Destination::Base(_))) {
                    *m = Some(Destination::Stranded);
                }
            }
            let state = MarkovState { runners: 0, outs: 3, runs_scored: self.before.runs_scored };
            return Transition { state, runs: 0, outs_added, moves };
        }

        let mut runners = 0u8;
        let mut runs = 0u32;
        for m in moves.iter().flatten() {
            match m {
                Destination::Base(b) if (1..=3).contains(b) => runners |= 1 << (b - 1),
                Destination::Scored => runs += 1,
                _ => {}
            }
        }
        let state = MarkovState { runners, outs, runs_scored: self.before.runs_scored + runs };
        Transition { state, runs, outs_added, moves }
    }
}

fn unchanged(state: MarkovState) -> Transition {
    Transition {
        state,
        runs: 0,
        outs_added: 0,
        moves: Play::new(state).moves,
    }
}

/// Forced advancement only (walk, hit by pitch, batter awarded first).
fn force_to_first(play: &mut Play) {
    play.batter(Destination::Base(1));
    if play.has(1) {
        play.set(1, Destination::Base(2));
        if play.has(2) {
            play.set(2, Destination::Base(3));
            if play.has(3) {
                play.set(3, Destination::Scored);
            }
        }
    }
}

fn everyone_up_one(play: &mut Play) {
    for base in (1..=3u8).rev() {
        if play.has(base) {
            play.set(base, Play::advance(base, 1));
        }
    }
}

/// Apply a plate-appearance outcome to the base-out state.
///
/// No-op once the inning is over.
pub fn apply_outcome(
    state: MarkovState,
    outcome: PaOutcome,
    speeds: &BaseSpeeds,
    gen: Generator,
) -> (Transition, Generator) {
    if state.inning_over() {
        return (unchanged(state), gen);
    }
    let mut play = Play::new(state);
    let mut gen = gen;

    match outcome {
        PaOutcome::Walk | PaOutcome::HitByPitch => force_to_first(&mut play),
        PaOutcome::HomeRun => {
            play.batter(Destination::Scored);
            for base in 1..=3u8 {
                if play.has(base) {
                    play.set(base, Destination::Scored);
                }
            }
        }
        PaOutcome::Triple => {
            play.batter(Destination::Base(3));
            for base in 1..=3u8 {
                if play.has(base) {
                    play.set(base, Destination::Scored);
                }
            }
        }
        PaOutcome::Double => {
            play.batter(Destination::Base(2));
            for base in 2..=3u8 {
                if play.has(base) {
                    play.set(base, Destination::Scored);
                }
            }
            if play.has(1) {
                let lead = (1..=3u8).rev().find(|b| play.has(*b)).unwrap_or(1);
                let p = speeds.tier(lead).pick([0.25, 0.40, 0.60]);
                let (scores, next) = gen.chance(p);
                gen = next;
                play.set(1, if scores { Destination::Scored } else { Destination::Base(3) });
            }
        }
        PaOutcome::Single => {
            play.batter(Destination::Base(1));
            if play.has(3) {
                play.set(3, Destination::Scored);
            }
            if play.has(2) {
                let p = speeds.tier(2).pick([0.45, 0.60, 0.75]);
                let (scores, next) = gen.chance(p);
                gen = next;
                play.set(2, if scores { Destination::Scored } else { Destination::Base(3) });
            }
            if play.has(1) {
                let third_open = !play.claimed(3);
                let p = speeds.tier(1).pick([0.15, 0.28, 0.42]);
                let (takes_third, next) = gen.chance(p);
                gen = next;
                let dest = if takes_third && third_open { 3 } else { 2 };
                play.set(1, Destination::Base(dest));
            }
        }
        PaOutcome::ReachedOnError => {
            play.batter(Destination::Base(1));
            everyone_up_one(&mut play);
        }
        PaOutcome::DoublePlay => {
            play.batter(Destination::Out);
            if play.has(1) {
                play.set(1, Destination::Out);
            }
            for base in (2..=3u8).rev() {
                if play.has(base) {
                    play.set(base, Play::advance(base, 1));
                }
            }
        }
        PaOutcome::SacrificeFly => {
            play.batter(Destination::Out);
            if play.has(3) {
                play.set(3, Destination::Scored);
            }
        }
        PaOutcome::GroundOut => {
            play.batter(Destination::Out);
            if state.outs < 2 {
                gen = ground_out_advance(&mut play, gen);
            }
        }
        PaOutcome::Strikeout | PaOutcome::FlyOut | PaOutcome::LineOut | PaOutcome::PopOut => {
            play.batter(Destination::Out)
        }
    }

    (play.finish(), gen)
}

const GROUND_OUT_SCORE_FROM_THIRD: f64 = 0.35;
const GROUND_OUT_SECOND_TO_THIRD: f64 = 0.50;

/// Forced runners always move up. Unforced runners on second and third each
/// get their own fixed-probability roll; a runner from second who wins the
/// roll still holds if the runner ahead stayed on third.
fn ground_out_advance(play: &mut Play, gen: Generator) -> Generator {
    let mut gen = gen;
    let forced_first = play.has(1);
    let forced_second = forced_first && play.has(2);
    let forced_third = forced_second && play.has(3);

    if play.has(3) {
        if forced_third {
            play.set(3, Destination::Scored);
        } else {
            let (scores, next) = gen.chance(GROUND_OUT_SCORE_FROM_THIRD);
            gen = next;
            if scores {
                play.set(3, Destination::Scored);
            }
        }
    }
    if play.has(2) {
        if forced_second {
            play.set(2, Destination::Base(3));
        } else {
            let (advances, next) = gen.chance(GROUND_OUT_SECOND_TO_THIRD);
            gen = next;
            if advances && !play.claimed(3) {
                play.set(2, Destination::Base(3));
            }
        }
    }
    if forced_first {
        play.set(1, Destination::Base(2));
    }
    gen
}

/// Wild pitch or passed ball: every runner moves up one base.
pub fn advance_all_one(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    everyone_up_one(&mut play);
    play.finish()
}

/// Walk or hit batsman: only forced runners move.
pub fn walk(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    force_to_first(&mut play);
    play.finish()
}

/// Steal attempt by the runner on `from` (1 or 2).
pub fn steal(state: MarkovState, from: u8, success: bool) -> Transition {
    if state.inning_over() || !state.is_occupied(from) || from >= 3 {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    play.set(from, if success { Destination::Base(from + 1) } else { Destination::Out });
    play.finish()
}

/// Batter out, every runner moves up one base.
pub fn sacrifice_bunt(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    play.batter(Destination::Out);
    everyone_up_one(&mut play);
    play.finish()
}

/// Batter beats the bunt out, every runner moves up one base.
pub fn bunt_hit(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    play.batter(Destination::Base(1));
    everyone_up_one(&mut play);
    play.finish()
}

/// Lead runner retired on a fielder's choice; batter safe at first and the
/// remaining forced runners move up.
pub fn fielders_choice(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    let lead = (1..=3u8).rev().find(|b| play.has(*b));
    force_to_first(&mut play);
    if let Some(lead) = lead {
        play.set(lead, Destination::Out);
    }
    play.finish()
}

/// Batter and lead runner both retired; other runners hold.
pub fn batter_and_lead_runner_out(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    play.batter(Destination::Out);
    if let Some(lead) = (1..=3u8).rev().find(|b| play.has(*b)) {
        play.set(lead, Destination::Out);
    }
    play.finish()
}

/// Batter retired without any runner moving (strikeout, failed bunt).
pub fn batter_out(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    play.batter(Destination::Out);
    play.finish()
}

/// Strikeout on a hit-and-run: batter out and the runner from first is
/// thrown out at second.
pub fn strikeout_caught_stealing(state: MarkovState) -> Transition {
    if state.inning_over() {
        return unchanged(state);
    }
    let mut play = Play::new(state);
    play.batter(Destination::Out);
    if play.has(1) {
        play.set(1, Destination::Out);
    }
    play.finish()
}
