//! bb_sim: run games, seasons and playoff brackets from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bb_core::engine::derive_seed;
use bb_core::season::playoff::seed_teams;
use bb_core::{
    demo_league, round_robin, simulate_playoffs, simulate_season, EngineConfig, GameEngine,
    GamePlan, League, PlayoffFormat, ScheduleEntry, SeasonState,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bb_sim")]
#[command(about = "Deterministic baseball season simulator", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a regular season
    Season {
        #[command(flatten)]
        input: LeagueInput,

        /// Schedule JSON file; defaults to a round robin over every team
        #[arg(long)]
        schedule: Option<PathBuf>,

        /// Round-robin repetitions when no schedule is given
        #[arg(long, default_value_t = 6)]
        rounds: u32,

        /// Run the playoffs from the final standings afterwards
        #[arg(long, default_value_t = false)]
        playoffs: bool,
    },

    /// Simulate a playoff bracket from explicit seeds
    Playoffs {
        #[command(flatten)]
        input: LeagueInput,

        /// Team ids, top seed first
        #[arg(long, value_delimiter = ',', required = true)]
        seeds: Vec<u32>,

        /// Playoff format JSON file; defaults to 3/5/7 game rounds
        #[arg(long)]
        format: Option<PathBuf>,
    },

    /// Simulate a single game with rested staffs
    Game {
        #[command(flatten)]
        input: LeagueInput,

        #[arg(long)]
        home: u32,

        #[arg(long)]
        away: u32,

        /// Include the play-by-play log
        #[arg(long, default_value_t = false)]
        play_by_play: bool,
    },

    /// Write a generated demo league to JSON
    Demo {
        #[arg(long, default_value_t = 30)]
        teams: u32,

        #[arg(long, default_value_t = 2024)]
        seed: u64,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct LeagueInput {
    /// League JSON file; a demo league is generated when omitted
    #[arg(long)]
    league: Option<PathBuf>,

    /// Teams in the generated demo league
    #[arg(long, default_value_t = 8)]
    teams: u32,

    /// Engine config (YAML or JSON, by extension)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::Realistic)]
    preset: Preset,

    #[arg(long, default_value_t = 2024)]
    seed: u64,

    /// Opening day, YYYY-MM-DD
    #[arg(long, default_value = "2024-04-01")]
    start: NaiveDate,

    /// Output JSON file; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Realistic,
    LiveBall,
    DeadBall,
    DeterministicTactics,
}

impl LeagueInput {
    fn load_league(&self) -> Result<League> {
        match &self.league {
            Some(path) => {
                let text = read(path)?;
                League::from_json_str(&text)
                    .with_context(|| format!("parsing league {}", path.display()))
            }
            None => Ok(demo_league(self.teams, self.seed)),
        }
    }

    fn load_config(&self) -> Result<EngineConfig> {
        let config = match &self.config {
            Some(path) => {
                let text = read(path)?;
                let is_yaml = path.extension().is_some_and(|e| e == "yaml" || e == "yml");
                let parsed = if is_yaml {
                    EngineConfig::from_yaml_str(&text)
                } else {
                    EngineConfig::from_json_str(&text)
                };
                parsed.with_context(|| format!("parsing config {}", path.display()))?
            }
            None => match self.preset {
                Preset::Realistic => EngineConfig::realistic(),
                Preset::LiveBall => EngineConfig::live_ball(),
                Preset::DeadBall => EngineConfig::dead_ball(),
                Preset::DeterministicTactics => EngineConfig::deterministic_tactics(),
            },
        };
        config.validate().context("validating engine config")?;
        Ok(config)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run_season(
    input: &LeagueInput,
    schedule: Option<&Path>,
    rounds: u32,
    playoffs: bool,
) -> Result<()> {
    let league = input.load_league()?;
    let config = input.load_config()?;
    let schedule: Vec<ScheduleEntry> = match schedule {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("parsing schedule {}", path.display()))?,
        None => {
            let ids: Vec<u32> = league.teams.iter().map(|t| t.id).collect();
            round_robin(&ids, rounds, input.start)
        }
    };

    let season =
        simulate_season(&league, &config, schedule, input.seed).context("simulating season")?;
    let summary = &season.summary;
    info!(
        games = season.completed,
        avg = format!("{:.3}", summary.batting_average),
        era = format!("{:.2}", summary.era),
        runs_per_game = format!("{:.2}", summary.runs_per_game),
        "season complete"
    );

    if !playoffs {
        return write_json(&season, input.out.as_deref());
    }

    let format = PlayoffFormat::default();
    let seeds = seed_teams(&season.stats, format.teams());
    let mut state: SeasonState = season.state.clone();
    let start = season.games.last().map(|g| g.date).unwrap_or(input.start);
    let playoff_seed = derive_seed(input.seed, u64::MAX);
    let bracket =
        simulate_playoffs(&league, &config, &format, &seeds, playoff_seed, start, &mut state)
            .context("simulating playoffs")?;

    #[derive(Serialize)]
    struct Output<'a> {
        season: &'a bb_core::SeasonResult,
        playoffs: &'a bb_core::PlayoffBracket,
    }
    write_json(&Output { season: &season, playoffs: &bracket }, input.out.as_deref())
}

fn run_playoffs(input: &LeagueInput, seeds: &[u32], format: Option<&Path>) -> Result<()> {
    let league = input.load_league()?;
    let config = input.load_config()?;
    let format: PlayoffFormat = match format {
        Some(path) => serde_json::from_str(&read(path)?)
            .with_context(|| format!("parsing format {}", path.display()))?,
        None => PlayoffFormat::default(),
    };
    if seeds.len() != format.teams() {
        bail!("{} seeds given, the bracket needs {}", seeds.len(), format.teams());
    }
    let mut state = SeasonState::new();
    let bracket =
        simulate_playoffs(&league, &config, &format, seeds, input.seed, input.start, &mut state)
            .context("simulating playoffs")?;
    info!(champion = ?bracket.champion, "playoffs complete");
    write_json(&bracket, input.out.as_deref())
}

fn run_game(input: &LeagueInput, home: u32, away: u32, play_by_play: bool) -> Result<()> {
    let league = input.load_league()?;
    let mut config = input.load_config()?;
    config.rules.record_play_by_play |= play_by_play;
    let plan = GamePlan::standalone(&league, 1, input.start, input.seed, home, away)
        .with_context(|| format!("building lineups for {} at {}", away, home))?;
    let result = GameEngine::new(&league.players, &config).simulate(&plan);
    info!(
        away = result.away_score,
        home = result.home_score,
        innings = result.innings,
        "game complete"
    );
    write_json(&result, input.out.as_deref())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Season { input, schedule, rounds, playoffs } => {
            run_season(&input, schedule.as_deref(), rounds, playoffs)
        }
        Commands::Playoffs { input, seeds, format } => {
            run_playoffs(&input, &seeds, format.as_deref())
        }
        Commands::Game { input, home, away, play_by_play } => {
            run_game(&input, home, away, play_by_play)
        }
        Commands::Demo { teams, seed, out } => {
            if teams < 2 {
                bail!("a league needs at least two teams");
            }
            write_json(&demo_league(teams, seed), out.as_deref())
        }
    }
}
