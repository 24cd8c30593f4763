//! Headless run of the classic demo: 20 random bodies, damped bounces, t = 0..100.
//!
//! Usage: `nbody-demo [config.json]`. Set `RUST_LOG=debug` to trace every collision.

use nbody_events::config::EngineConfig;
use nbody_events::core::{CollisionScheduler, Damping, Scatter};
use nbody_events::error::Result;

const FRAME_DT: f64 = 0.1;
const FRAMES: u32 = 1000;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {path}");
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };

    let bodies = Scatter::default().generate()?;
    let mut sched = CollisionScheduler::new(bodies, config, Damping::default())?;
    log::info!(
        "simulating {} bodies for {} frames",
        sched.num_bodies(),
        FRAMES
    );

    for frame in 1..=FRAMES {
        sched.advance(f64::from(frame) * FRAME_DT)?;
    }

    log::info!(
        "t={:.1}: {} collisions resolved",
        sched.time(),
        sched.events_processed()
    );
    for (i, b) in sched.bodies().iter().enumerate() {
        println!("i={i}: {}", b.revision());
    }
    Ok(())
}
