//! Event-driven collision engine for dimensionless point bodies.
//!
//! The predictor computes when two participants meet; the scheduler keeps the
//! time-ordered heap of those predictions and resolves them in causal order.

pub mod body;
pub mod boundary;
pub mod event;
pub mod predictor;
pub mod response;
pub mod scatter;
pub mod scheduler;

pub use body::{Body, BodyId};
pub use boundary::{Axis, Boundary, Wall};
pub use event::{CollisionEvent, Participant};
pub use predictor::{Kinematic, Predictor, Subject};
pub use response::{CollisionResponse, Damping, Ignore, Impact, Reflect};
pub use scatter::Scatter;
pub use scheduler::CollisionScheduler;
