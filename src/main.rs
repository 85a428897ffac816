//! Wildhold headless runner
//!
//! Generates a world and drives the simulation with scripted input, logging
//! what happens. Usage: `wildhold [TUNING.json] [SEED] [TICKS]`

use glam::Vec2;

use wildhold::consts::FRAME_MS;
use wildhold::sim::{GameEvent, GamePhase, GameState, PlayerClass, TickInput, actions, advance};
use wildhold::{SimError, Tuning};

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_TICKS: u64 = 60 * 60 * 5;

/// Wander in a slow circle, swinging at whatever is in front
fn scripted_input(tick: u64) -> TickInput {
    let angle = tick as f32 * 0.01;
    let dir = Vec2::new(angle.cos(), angle.sin());
    TickInput {
        move_dir: dir,
        primary: tick % 10 == 0,
        ..Default::default()
    }
}

fn run() -> Result<(), SimError> {
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED);
    let ticks = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_TICKS);

    log::info!("Generating world (seed {})", seed);
    let mut state = GameState::new(seed, PlayerClass::Knight, tuning);

    let mut kills = 0usize;
    for tick in 0..ticks {
        advance(&mut state, &scripted_input(tick), FRAME_MS);

        for event in &state.events {
            match event {
                GameEvent::Killed { .. } => kills += 1,
                GameEvent::PlayerDied => log::info!("Player died on day {}", state.clock.day),
                GameEvent::NewDay { day } => log::info!(
                    "Day {}: {} hostiles, level {}, {} kills",
                    day,
                    state.hostiles.len(),
                    state.player.level,
                    kills
                ),
                _ => {}
            }
        }

        if state.phase == GamePhase::GameOver {
            actions::respawn(&mut state);
        }
    }

    log::info!(
        "Finished {} ticks: day {}, {} hostiles, {} bosses, level {}, {} kills",
        state.tick_count,
        state.clock.day,
        state.hostiles.len(),
        state.bosses.len(),
        state.player.level,
        kills
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Wildhold (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
