#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Waypoint Defence level headlessly.

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waypoint_defence_core::{BuildSpotId, Command, Event, TowerKind};
use waypoint_defence_world::{self as world, query, LevelDescription};

/// Runs a level file until it is won, lost or the tick limit is hit.
#[derive(Debug, Parser)]
#[command(name = "waypoint-defence", version, about)]
struct Cli {
    /// Path to a TOML level description.
    #[arg(long)]
    level: PathBuf,

    /// Seed for spawn node and route selection.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Stop after this many ticks even without an outcome.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Tower placed before the first tick, as `<spot>:<kind>`. Repeatable.
    #[arg(long = "tower", value_parser = parse_placement)]
    towers: Vec<Placement>,
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    spot: BuildSpotId,
    kind: TowerKind,
}

fn parse_placement(value: &str) -> Result<Placement> {
    let Some((spot, kind)) = value.split_once(':') else {
        bail!("expected <spot>:<kind>, got `{value}`");
    };
    let spot = spot
        .trim()
        .parse::<u32>()
        .with_context(|| format!("invalid build spot `{spot}`"))?;
    let kind = match kind.trim().to_ascii_lowercase().as_str() {
        "archer" => TowerKind::Archer,
        "cannon" => TowerKind::Cannon,
        "mage" => TowerKind::Mage,
        other => bail!("unknown tower kind `{other}`"),
    };
    Ok(Placement {
        spot: BuildSpotId::new(spot),
        kind,
    })
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let text = std::fs::read_to_string(&cli.level)
        .with_context(|| format!("failed to read level {}", cli.level.display()))?;
    let level = LevelDescription::from_toml_str(&text)
        .with_context(|| format!("failed to parse level {}", cli.level.display()))?;
    let mut area = level
        .build(cli.seed)
        .with_context(|| format!("invalid level {}", cli.level.display()))?;

    let mut events = Vec::new();
    for placement in &cli.towers {
        world::apply(
            &mut area,
            Command::PlaceTower {
                spot: placement.spot,
                kind: placement.kind,
            },
            &mut events,
        );
    }
    report(&events);

    let dt = Duration::from_millis(cli.tick_ms);
    let mut ticks = 0;
    while ticks < cli.max_ticks && query::outcome(&area).is_none() {
        events.clear();
        world::apply(&mut area, Command::Tick { dt }, &mut events);
        report(&events);
        ticks += 1;
    }

    let outcome = query::outcome(&area)
        .map_or_else(|| "undecided".to_owned(), |outcome| format!("{outcome:?}"));
    println!(
        "outcome={outcome} ticks={ticks} elapsed_ms={} gold={} life={}",
        query::elapsed(&area).as_millis(),
        query::gold(&area),
        query::life(&area),
    );
    Ok(())
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::TowerPlacementRejected { spot, kind, reason } => {
                tracing::warn!(spot = spot.get(), ?kind, ?reason, "tower placement rejected");
            }
            Event::MonsterEscaped {
                monster, damage, ..
            } => {
                tracing::info!(monster = monster.get(), damage, "monster escaped");
            }
            Event::MonsterKilled {
                monster, reward, ..
            } => {
                tracing::info!(monster = monster.get(), reward, "monster killed");
            }
            Event::TimeAdvanced { .. } => {}
            other => tracing::trace!(event = ?other, "event"),
        }
    }
}
