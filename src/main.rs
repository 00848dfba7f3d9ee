use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use evo_snake::eval::{RunConfig, StrategyRegistry};
use evo_snake::game::{BoundaryMode, SpawnMode, WorldConfig};
use evo_snake::modes::{score_replay, DemoConfig, DemoMode, ReplayMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "evo_snake")]
#[command(version, about = "Snake simulation core for evolved policies")]
struct Cli {
    /// What to run
    #[arg(long, default_value = "demo")]
    mode: Mode,

    /// Grid width
    #[arg(long, default_value = "30")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "30")]
    height: usize,

    /// Apple spawn mode
    #[arg(long, default_value = "single")]
    spawn: Spawn,

    /// What happens at the grid edge
    #[arg(long, default_value = "bounded")]
    boundary: Boundary,

    /// Fitness strategy name
    #[arg(long, default_value = "balanced")]
    strategy: String,

    /// Maximum steps per episode
    #[arg(long, default_value = "1000")]
    step_cap: u32,

    /// Seed for apple placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Episodes to play in demo mode
    #[arg(long, default_value = "20")]
    episodes: usize,

    /// Replay document to write (demo) or read (replay, score)
    #[arg(long, default_value = "runs/game_states.json")]
    replay: PathBuf,

    /// Delay between replayed frames in milliseconds
    #[arg(long, default_value = "100")]
    delay_ms: u64,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play recorded episodes with the greedy baseline and save the best
    Demo,
    /// Watch a saved replay in the terminal
    Replay,
    /// Recompute a saved replay's fitness
    Score,
}

#[derive(Clone, Copy, ValueEnum)]
enum Spawn {
    Single,
    Multi,
}

#[derive(Clone, Copy, ValueEnum)]
enum Boundary {
    Bounded,
    Wrap,
}

impl From<Spawn> for SpawnMode {
    fn from(spawn: Spawn) -> Self {
        match spawn {
            Spawn::Single => SpawnMode::Single,
            Spawn::Multi => SpawnMode::Multi,
        }
    }
}

impl From<Boundary> for BoundaryMode {
    fn from(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Bounded => BoundaryMode::Bounded,
            Boundary::Wrap => BoundaryMode::Wrap,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.mode {
        Mode::Demo => {
            let mut world = WorldConfig::new(cli.width, cli.height)
                .with_spawn_mode(cli.spawn.into())
                .with_boundary_mode(cli.boundary.into());
            world.seed = cli.seed;
            world.validate().context("Invalid world configuration")?;

            let mut config = DemoConfig::new(cli.episodes, cli.replay);
            config.world = world;
            config.run = RunConfig {
                strategy: cli.strategy,
                step_cap: cli.step_cap,
                ..RunConfig::default()
            };

            let mut demo_mode = DemoMode::new(config)?;
            demo_mode.run()?;
        }
        Mode::Replay => {
            let mut replay_mode =
                ReplayMode::load(&cli.replay, Duration::from_millis(cli.delay_ms))?;
            replay_mode.run().await?;
        }
        Mode::Score => {
            let score = score_replay(&cli.replay, &cli.strategy, &StrategyRegistry::builtin())?;
            info!(
                strategy = %score.strategy,
                apples = score.apples,
                steps = score.steps,
                fitness = score.fitness,
                "replay scored"
            );
            println!("{:.2}", score.fitness);
        }
    }

    Ok(())
}
