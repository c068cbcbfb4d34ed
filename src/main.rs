use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use snake_qtable::game::GameConfig;
use snake_qtable::modes::{clear_table, DemoMode, TrainConfig, TrainMode};
use snake_qtable::rl::JsonFileStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snake_qtable")]
#[command(version, about = "Snake trained with tabular Q-learning")]
struct Cli {
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Grid width
    #[arg(long, default_value = "20")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "20")]
    height: usize,

    /// Number of environments trained in lockstep
    #[arg(long, default_value = "16")]
    envs: usize,

    /// Q-table file
    #[arg(long, default_value = "q_table.json")]
    table: PathBuf,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Train without the TUI, logging progress instead
    #[arg(long)]
    headless: bool,

    /// Stop training after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Log progress every N finished episodes
    #[arg(long, default_value = "100")]
    log_frequency: usize,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the Q-table, resuming from the saved one
    Train,
    /// Watch the saved Q-table play greedily
    Demo,
    /// Delete the saved Q-table
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs share the terminal with the TUI, so keep them quiet there
    let quiet_tui = match cli.mode {
        Mode::Train => !cli.headless,
        Mode::Demo => true,
        Mode::Reset => false,
    };
    let default_filter = if quiet_tui { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let game_config = GameConfig::new(cli.width, cli.height);
    game_config.validate().map_err(|e| anyhow!(e))?;

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.table);
            config.num_envs = cli.envs;
            config.seed = cli.seed;
            config.max_ticks = cli.max_ticks;
            config.log_frequency = cli.log_frequency;
            config.game_config = game_config;
            config.validate().map_err(|e| anyhow!(e))?;

            let mut train_mode = TrainMode::new(config);
            train_mode.run(cli.headless).await?;
        }
        Mode::Demo => {
            let store = JsonFileStore::new(cli.table);
            let mut demo_mode = DemoMode::new(game_config, &store, cli.seed);
            demo_mode.run().await?;
        }
        Mode::Reset => {
            let store = JsonFileStore::new(cli.table);
            if clear_table(&store)? {
                println!("Q-table {:?} deleted.", store.path());
            } else {
                println!("No Q-table at {:?}.", store.path());
            }
        }
    }

    Ok(())
}
