//! Exact event-driven collisions for point bodies in a 2D box.
//!
//! Bodies move in straight lines between collisions. Instead of stepping time
//! in fixed increments, [`core::CollisionScheduler`] predicts the instant of
//! every pair and wall contact, keeps the predictions in a min-heap, and
//! resolves them in time order whenever the caller advances the clock.
//!
//! ```
//! use nbody_events::config::EngineConfig;
//! use nbody_events::core::{Body, CollisionScheduler, Reflect};
//!
//! # fn main() -> nbody_events::error::Result<()> {
//! let bodies = vec![
//!     Body::new([-10.0, 0.0], [1.0, 0.0])?,
//!     Body::new([10.0, 0.0], [-1.0, 0.0])?,
//! ];
//! let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Reflect)?;
//! sched.advance(15.0)?;
//! assert_eq!(sched.events_processed(), 1);
//! assert_eq!(sched.bodies()[0].position, [-5.0, 0.0]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;
