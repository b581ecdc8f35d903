use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use projectile_game::{
    entities::PlayerConfig, entity::Entity, events::Event, input::InputSnapshot, Level,
    LevelConfig,
};

// ---------------------------------------------------------------------------------------------------------------------

/// Runs a countdown level headless and reports what happened.
#[derive(StructOpt, Debug)]
struct Options {
    /// Number of ticks to simulate, at 60 ticks per second
    #[structopt(short, long, default_value = "3600")]
    ticks: u64,

    /// Seed for the level's random number generator
    #[structopt(short, long, default_value = "0")]
    seed: u64,

    /// The character starting the level
    #[structopt(short, long, default_value = "Fred")]
    player: String,

    /// A RON file holding a LevelConfig
    #[structopt(long, parse(from_os_str))]
    tuning: Option<PathBuf>,

    /// A RON file holding a list of input snapshots, replayed in a loop. Without one the
    /// player runs back and forth firing.
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Baddies to spawn before the first tick
    #[structopt(long)]
    baddie: Vec<String>,

    /// Log every level event
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------------------------------------------------

fn load_ron<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Unable to read \"{}\"", path.display()))?;
    ron::de::from_str(&text).with_context(|| format!("Unable to parse \"{}\"", path.display()))
}

/// Runs right for four seconds, then left for four, tapping fire and jumping now and then.
fn autopilot(tick: u64) -> InputSnapshot {
    let rightward = (tick / 240) % 2 == 0;
    InputSnapshot {
        right: rightward,
        left: !rightward,
        up: (tick / 600) % 3 == 1,
        jump: tick % 90 < 10,
        fire: tick % 2 == 0,
        ..InputSnapshot::none()
    }
}

fn main() -> Result<()> {
    let opt = Options::from_args();

    let default_filter = if opt.verbose {
        "projectile_game=debug"
    } else {
        "projectile_game=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(default_filter.parse()?))
        .init();

    let config: LevelConfig = match &opt.tuning {
        Some(path) => load_ron(path)?,
        None => LevelConfig::default(),
    };
    let script: Vec<InputSnapshot> = match &opt.script {
        Some(path) => load_ron(path)?,
        None => vec![],
    };
    let player = PlayerConfig::by_name(&opt.player)?;

    let mut level = Level::new(config, &player, opt.seed)?;
    for classname in &opt.baddie {
        level.spawn_baddie(classname)?;
    }

    let mut kills = 0;
    for tick in 0..opt.ticks {
        let input = if script.is_empty() {
            autopilot(tick)
        } else {
            script[(tick as usize) % script.len()]
        };
        level.update(&input)?;

        for message in level.drain_events() {
            debug!("{:?}", message);
            if let Event::BaddieKilled { .. } = message.event {
                kills += 1;
            }
        }
        if level.is_dead() {
            break;
        }
    }

    let (weapon, ammo) = level.ammo();
    info!(
        "{} ticks, score {}, {} kills, {} hp, {} {} ({} ready), {} baddies in play{}",
        level.ticks(),
        level.score(),
        kills,
        level.player().vitals().hp(),
        level.player().name(),
        weapon,
        ammo,
        level.baddies().len(),
        if level.is_dead() { ", game over" } else { "" }
    );
    Ok(())
}
