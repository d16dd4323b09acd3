//! Headless delve driver
//!
//! Loads an arena, then plays a random walker through the turn engine and
//! prints the message log and the final board. Animations finish instantly.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use delve_core::arena::snapshot;
use delve_core::{Action, Arena, Engine, EngineConfig, GameRng, Outcome};

const DEFAULT_ARENA: &str = "\
####################
#@.....~~~.....!...#
#..o...~~~..\"\"\"....#
#......__.....j..*.#
#..^^.....&&...k...#
#.....N.....\"\"..[..#
#..?....T........./#
####################
";

/// Run the delve turn engine without a renderer
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Headless delve turn engine", long_about = None)]
struct Args {
    /// ASCII arena layout to load instead of the built-in one
    #[arg(short = 'a', long = "arena")]
    arena: Option<PathBuf>,

    /// JSON engine configuration
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// RNG seed; random when omitted
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Number of player actions to play
    #[arg(short = 't', long = "turns", default_value_t = 50)]
    turns: u32,

    /// Log filter used when RUST_LOG is unset
    #[arg(short = 'l', long = "log", default_value = "delve=info,delve_core=info")]
    log: String,
}

fn main() -> delve_core::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let arena = match &args.arena {
        Some(path) => Arena::load(path)?,
        None => Arena::parse(DEFAULT_ARENA)?,
    };
    let rng = args.seed.map_or_else(GameRng::from_entropy, GameRng::new);
    // the walker gets its own stream so the engine's rolls stay reproducible
    let mut walker = GameRng::new(rng.seed().wrapping_add(1));
    info!(seed = rng.seed(), width = arena.width(), height = arena.height(), "starting");

    let world = arena.into_world(&config);
    let mut engine = Engine::new(world, config, rng);
    let Some(player) = engine.player_id() else {
        warn!("arena produced no player");
        return Ok(());
    };

    for _ in 0..args.turns {
        let mut outcome = engine.handle_action(random_action(&mut walker));
        while let Outcome::Animate(animation) = outcome {
            info!(?animation, "playing animation");
            outcome = engine.animation_tick(true);
        }
        for message in engine.drain_messages() {
            println!("[{:>3}] {message}", engine.turn());
        }
        match outcome {
            Outcome::PlayerDied => {
                println!("The player has died on turn {}.", engine.turn());
                break;
            }
            Outcome::Exit => break,
            _ => {}
        }
    }

    println!();
    println!("{}", snapshot(engine.world()));
    for bar in engine.status_bars(player) {
        println!("{}: {}/{}", bar.name, bar.current, bar.maximum);
    }
    for (name, equipped, uses) in engine.inventory_listing() {
        let worn = if equipped { " (equipped)" } else { "" };
        match uses {
            Some(n) => println!("  {name}{worn} [{n} left]"),
            None => println!("  {name}{worn}"),
        }
    }
    Ok(())
}

/// Mostly walk, sometimes wait or pick things up
fn random_action(rng: &mut GameRng) -> Action {
    match rng.rn2(10) {
        0 => Action::Wait,
        1 => Action::Pickup,
        _ => Action::Move {
            dx: rng.rn2(3) as i32 - 1,
            dy: rng.rn2(3) as i32 - 1,
        },
    }
}
