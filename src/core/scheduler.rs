use crate::config::EngineConfig;
use crate::core::body::{Body, BodyId};
use crate::core::boundary::{Axis, Boundary};
use crate::core::event::{CollisionEvent, Participant};
use crate::core::predictor::{Kinematic, Predictor};
use crate::core::response::{CollisionResponse, Impact};
use crate::error::{Error, Result};
use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Discrete-event collision engine over a fixed set of point bodies.
///
/// Holds the body arena, the clock and a min-heap of predicted collisions.
/// Predictions are never removed eagerly: each carries the revisions of its
/// bodies and is dropped on extraction once any of them has moved on.
///
/// Contacts already resolved at the current instant are remembered so that
/// re-predicting them at `dt ≈ 0` does not fire them again.
#[derive(Debug)]
pub struct CollisionScheduler<R, P = Kinematic> {
    time_now: f64,
    boundary: Boundary,
    bodies: Vec<Body>,
    pq: BinaryHeap<Reverse<CollisionEvent>>,
    response: R,
    predictor: P,
    processed: u64,
    tolerance: f64,
    resolved_at: f64,
    resolved_now: Vec<(Participant, Participant)>,
}

impl<R: CollisionResponse> CollisionScheduler<R, Kinematic> {
    /// Build a scheduler with the analytic predictor at `config.tolerance`.
    pub fn new(bodies: Vec<Body>, config: EngineConfig, response: R) -> Result<Self> {
        let predictor = config.predictor()?;
        Self::with_predictor(bodies, config, response, predictor)
    }
}

impl<R: CollisionResponse, P: Predictor> CollisionScheduler<R, P> {
    /// Build a scheduler with a custom predictor and enqueue every initial prediction.
    ///
    /// The clock starts at 0 with all body states valid at that instant.
    pub fn with_predictor(
        bodies: Vec<Body>,
        config: EngineConfig,
        response: R,
        predictor: P,
    ) -> Result<Self> {
        config.validate()?;
        for (i, b) in bodies.iter().enumerate() {
            if !b.position.iter().chain(&b.velocity).all(|x| x.is_finite()) {
                return Err(Error::InvalidParam(format!(
                    "body {i} has a non-finite position or velocity"
                )));
            }
        }

        let mut sched = Self {
            time_now: 0.0,
            boundary: config.boundary,
            bodies,
            pq: BinaryHeap::new(),
            response,
            predictor,
            processed: 0,
            tolerance: config.tolerance,
            resolved_at: 0.0,
            resolved_now: Vec::new(),
        };
        sched.schedule_initial_events()?;
        debug!(
            "scheduler ready: {} bodies, {} pending events",
            sched.bodies.len(),
            sched.pq.len()
        );
        Ok(sched)
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    /// The body arena, indexed by `BodyId`.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// One body, or `Error::UnknownBody`.
    pub fn body(&self, id: BodyId) -> Result<&Body> {
        self.bodies.get(id.index()).ok_or(Error::UnknownBody(id.index()))
    }

    /// Number of bodies.
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// The box the bodies bounce inside.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; 2]> {
        self.bodies.iter().map(|b| b.position).collect()
    }

    /// Heap entries, stale ones included.
    pub fn pending(&self) -> usize {
        self.pq.len()
    }

    /// Number of collisions resolved so far.
    pub fn events_processed(&self) -> u64 {
        self.processed
    }

    /// The collision response.
    pub fn response(&self) -> &R {
        &self.response
    }

    /// Mutable access to the response between steps.
    pub fn response_mut(&mut self) -> &mut R {
        &mut self.response
    }

    /// The collision predictor.
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Consume the scheduler and hand the bodies back.
    pub fn into_bodies(self) -> Vec<Body> {
        self.bodies
    }

    /// True when no current prediction is left in the heap.
    pub fn is_empty(&self) -> bool {
        !self
            .pq
            .iter()
            .any(|Reverse(ev)| ev.is_current(&self.bodies))
    }

    /// Time of the earliest still-valid prediction. Stale heads are dropped on the way.
    pub fn next_event_time(&mut self) -> Option<f64> {
        while let Some(Reverse(ev)) = self.pq.peek() {
            if ev.is_current(&self.bodies) {
                return Some(ev.time_f64());
            }
            trace!("dropping stale event at t={}", ev.time_f64());
            self.pq.pop();
        }
        None
    }

    /// Resolve exactly one collision, or return `Ok(None)` if nothing is pending.
    ///
    /// All bodies are drifted to the event time, the response is applied, and
    /// every body participant gets a new revision and fresh predictions.
    pub fn step(&mut self) -> Result<Option<CollisionEvent>> {
        let Some(ev) = self.pop_current() else {
            return Ok(None);
        };

        let t_ev = ev.time_f64();
        self.drift_all(t_ev)?;

        let before: Vec<(BodyId, [f64; 2])> = ev
            .bodies()
            .map(|id| (id, self.bodies[id.index()].velocity))
            .collect();
        self.response.respond(&mut Impact::new(ev, &mut self.bodies));

        // Roll back a bad response and requeue its event.
        let bad = ev
            .bodies()
            .find(|id| !self.bodies[id.index()].velocity.iter().all(|v| v.is_finite()));
        if let Some(bad) = bad {
            for (id, v) in before {
                self.bodies[id.index()].velocity = v;
            }
            self.pq.push(Reverse(ev));
            return Err(Error::InvalidParam(format!(
                "collision response left body {} with a non-finite velocity",
                bad.index()
            )));
        }

        for id in ev.bodies() {
            self.bodies[id.index()].bump_revision();
        }
        if t_ev - self.resolved_at > self.same_instant() {
            self.resolved_now.clear();
            self.resolved_at = t_ev;
        }
        self.resolved_now.push((ev.a, ev.b));

        // Both sides are bumped before any prediction so the shared pair is recorded once.
        let mut done: Option<BodyId> = None;
        for id in ev.bodies() {
            self.reschedule_for_body(id, done)?;
            done = Some(id);
        }

        self.processed += 1;
        debug!("t={t_ev:.6}: resolved {:?} vs {:?}", ev.a, ev.b);
        Ok(Some(ev))
    }

    /// Advance the clock to `target_time` (must be ≥ current time).
    ///
    /// Every collision strictly before `target_time` is resolved in time order
    /// first; then all bodies drift the remaining interval.
    pub fn advance(&mut self, target_time: f64) -> Result<()> {
        if !target_time.is_finite() {
            return Err(Error::InvalidParam("target_time must be finite".into()));
        }
        if target_time < self.time_now {
            return Err(Error::TimeReversal {
                target: target_time,
                now: self.time_now,
            });
        }

        while let Some(t) = self.next_event_time() {
            if t >= target_time {
                break;
            }
            self.step()?;
        }

        self.drift_all(target_time)
    }

    // ============ Internal helpers ============

    fn pop_current(&mut self) -> Option<CollisionEvent> {
        while let Some(Reverse(ev)) = self.pq.pop() {
            if ev.is_current(&self.bodies) {
                return Some(ev);
            }
            trace!("dropping stale event at t={}", ev.time_f64());
        }
        None
    }

    fn schedule_initial_events(&mut self) -> Result<()> {
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                self.schedule_pair(i, j)?;
            }
        }
        for i in 0..n {
            self.schedule_walls(i)?;
        }
        Ok(())
    }

    /// Width of "now": contacts closer than this to the clock count as the current instant.
    #[inline]
    fn same_instant(&self) -> f64 {
        self.tolerance * self.time_now.abs().max(1.0)
    }

    /// A contact resolved at this instant and predicted again at `dt ≈ 0`.
    fn is_repeat(&self, a: Participant, b: Participant, dt: f64) -> bool {
        dt <= self.same_instant() && self.resolved_now.contains(&(a, b))
    }

    fn reschedule_for_body(&mut self, id: BodyId, skip: Option<BodyId>) -> Result<()> {
        let i = id.index();
        self.schedule_walls(i)?;
        for j in 0..self.bodies.len() {
            if j == i || skip.is_some_and(|s| s.index() == j) {
                continue;
            }
            self.schedule_pair(i, j)?;
        }
        Ok(())
    }

    fn schedule_pair(&mut self, i: usize, j: usize) -> Result<()> {
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        let (ba, bb) = (&self.bodies[a], &self.bodies[b]);
        let Some(dt) = self.predictor.bodies(ba, bb) else {
            return Ok(());
        };
        if self.is_repeat(Participant::Body(BodyId(a)), Participant::Body(BodyId(b)), dt) {
            return Ok(());
        }
        let t_abs = self.time_now + dt;
        if !t_abs.is_finite() {
            return Ok(());
        }
        let ev = CollisionEvent::between(t_abs, BodyId(a), ba, BodyId(b), bb)?;
        self.pq.push(Reverse(ev));
        Ok(())
    }

    fn schedule_walls(&mut self, i: usize) -> Result<()> {
        for axis in Axis::ALL {
            let body = &self.bodies[i];
            let Some((dt, wall)) = self.predictor.wall(body, &self.boundary, axis) else {
                continue;
            };
            if self.is_repeat(Participant::Body(BodyId(i)), Participant::Boundary(wall), dt) {
                continue;
            }
            let t_abs = self.time_now + dt;
            if !t_abs.is_finite() {
                continue;
            }
            let ev = CollisionEvent::against_wall(t_abs, BodyId(i), body, wall)?;
            self.pq.push(Reverse(ev));
        }
        Ok(())
    }

    /// Drift all bodies to the specified absolute time by linear motion.
    fn drift_all(&mut self, to_time: f64) -> Result<()> {
        if to_time < self.time_now {
            return Err(Error::TimeReversal {
                target: to_time,
                now: self.time_now,
            });
        }
        let dt = to_time - self.time_now;
        if dt > 0.0 {
            for b in &mut self.bodies {
                b.drift(dt);
            }
        }
        self.time_now = to_time;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::boundary::Wall;
    use crate::core::event::Participant;
    use crate::core::response::{Ignore, Reflect};

    fn open_space() -> EngineConfig {
        EngineConfig::default().with_boundary(Boundary {
            min_x: -1e9,
            max_x: 1e9,
            min_y: -1e9,
            max_y: 1e9,
        })
    }

    #[test]
    fn empty_body_set_is_idle() -> Result<()> {
        let mut sched = CollisionScheduler::new(Vec::new(), EngineConfig::default(), Ignore)?;
        assert!(sched.is_empty());
        assert_eq!(sched.step()?, None);
        sched.advance(10.0)?;
        assert_eq!(sched.time(), 10.0);
        Ok(())
    }

    #[test]
    fn initial_events_cover_pairs_and_walls() -> Result<()> {
        let bodies = vec![
            Body::new([-50.0, 0.0], [1.0, 0.0])?,
            Body::new([50.0, 0.0], [-1.0, 0.0])?,
        ];
        let sched = CollisionScheduler::new(bodies, EngineConfig::default(), Ignore)?;
        // One pair event plus one x-wall event per body; y velocities are zero.
        assert_eq!(sched.pending(), 3);
        assert!(!sched.is_empty());
        Ok(())
    }

    #[test]
    fn step_bumps_only_participants() -> Result<()> {
        let bodies = vec![
            Body::new([-1.0, 0.0], [1.0, 0.0])?,
            Body::new([1.0, 0.0], [-1.0, 0.0])?,
            Body::new([0.0, 100.0], [0.0, 0.0])?,
        ];
        let mut sched = CollisionScheduler::new(bodies, open_space(), Reflect)?;
        let ev = sched.step()?.expect("pair should collide");
        assert_eq!(ev.time_f64(), 1.0);
        assert_eq!(ev.a, Participant::Body(BodyId(0)));
        assert_eq!(ev.b, Participant::Body(BodyId(1)));
        let revs: Vec<u64> = sched.bodies().iter().map(Body::revision).collect();
        assert_eq!(revs, vec![1, 1, 0]);
        assert_eq!(sched.time(), 1.0);
        assert_eq!(sched.events_processed(), 1);
        Ok(())
    }

    #[test]
    fn stale_predictions_are_skipped() -> Result<()> {
        // Body 0 hits body 1 at t=1 and is reflected before it can reach body 2 at t=2.
        let bodies = vec![
            Body::new([0.0, 0.0], [1.0, 0.0])?,
            Body::new([1.0, 0.0], [0.0, 0.0])?,
            Body::new([2.0, 0.0], [0.0, 0.0])?,
        ];
        let mut sched = CollisionScheduler::new(bodies, open_space(), Reflect)?;
        let first = sched.step()?.expect("first collision");
        assert_eq!(first.time_f64(), 1.0);
        // Body 1 inherits the velocity and reaches body 2 at t=2; the old 0-2 prediction is stale.
        let second = sched.step()?.expect("second collision");
        assert_eq!(second.time_f64(), 2.0);
        assert_eq!(second.a, Participant::Body(BodyId(1)));
        assert_eq!(second.b, Participant::Body(BodyId(2)));
        Ok(())
    }

    #[test]
    fn advance_rejects_time_reversal() -> Result<()> {
        let bodies = vec![Body::new([0.0, 0.0], [1.0, 0.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Ignore)?;
        sched.advance(5.0)?;
        let err = sched.advance(4.0).unwrap_err();
        assert!(matches!(err, Error::TimeReversal { .. }));
        assert!(sched.advance(f64::NAN).is_err());
        // Same target is a no-op.
        sched.advance(5.0)?;
        assert_eq!(sched.bodies()[0].position, [5.0, 0.0]);
        Ok(())
    }

    #[test]
    fn wall_bounce_keeps_body_inside() -> Result<()> {
        let bodies = vec![Body::new([0.0, 0.0], [5.0, 0.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Reflect)?;
        sched.advance(60.0)?;
        // Hits x=256 at t=51.2, then travels back for 8.8.
        let x = sched.bodies()[0].position[0];
        assert!((x - (256.0 - 5.0 * 8.8)).abs() < 1e-9);
        assert_eq!(sched.bodies()[0].revision(), 1);
        Ok(())
    }

    #[test]
    fn ignore_response_passes_through_walls_once() -> Result<()> {
        let bodies = vec![Body::new([250.0, 0.0], [1.0, 0.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Ignore)?;
        let ev = sched.step()?.expect("wall contact");
        assert_eq!(ev.b, Participant::Boundary(Wall::Right));
        // Beyond the wall and moving away: nothing further.
        assert!(sched.is_empty());
        Ok(())
    }

    #[test]
    fn non_finite_response_rolls_back() -> Result<()> {
        let bodies = vec![
            Body::new([-1.0, 0.0], [1.0, 0.0])?,
            Body::new([1.0, 0.0], [-1.0, 0.0])?,
        ];
        let poison = |impact: &mut Impact<'_>| {
            if let Some(v) = impact.velocity_mut(BodyId(0)) {
                v[0] = 7.0;
            }
            if let Some(v) = impact.velocity_mut(BodyId(1)) {
                v[0] = f64::NAN;
            }
        };
        let mut sched = CollisionScheduler::new(bodies, open_space(), poison)?;
        assert!(matches!(sched.step(), Err(Error::InvalidParam(_))));

        // Nothing but the clock moved; the same collision is still next.
        let revs: Vec<u64> = sched.bodies().iter().map(Body::revision).collect();
        assert_eq!(revs, vec![0, 0]);
        assert_eq!(sched.bodies()[0].velocity, [1.0, 0.0]);
        assert_eq!(sched.bodies()[1].velocity, [-1.0, 0.0]);
        assert_eq!(sched.time(), 1.0);
        assert_eq!(sched.next_event_time(), Some(1.0));
        assert_eq!(sched.events_processed(), 0);
        assert!(sched.bodies().iter().all(|b| b.position[0].is_finite()));
        Ok(())
    }

    #[test]
    fn corner_hit_bounces_off_both_walls() -> Result<()> {
        let bodies = vec![Body::new([0.0, 0.0], [4.0, 4.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Reflect)?;
        sched.advance(100.0)?;
        let b = &sched.bodies()[0];
        assert_eq!(b.velocity, [-4.0, -4.0]);
        assert_eq!(b.position, [112.0, 112.0]);
        assert_eq!(b.revision(), 2);
        assert!(sched.boundary().contains(b.position));
        Ok(())
    }

    #[test]
    fn corner_pass_through_terminates() -> Result<()> {
        let bodies = vec![Body::new([0.0, 0.0], [4.0, 4.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Ignore)?;
        sched.advance(100.0)?;
        // Each wall fires once at t=64, then the body is outside and leaving.
        assert_eq!(sched.events_processed(), 2);
        assert!(sched.is_empty());
        Ok(())
    }

    #[test]
    fn contact_closer_than_tolerance_still_fires() -> Result<()> {
        let bodies = vec![Body::new([256.0 - 1e-10, 0.0], [1.0, 0.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Reflect)?;
        sched.advance(10.0)?;
        assert_eq!(sched.events_processed(), 1);
        assert_eq!(sched.bodies()[0].velocity, [-1.0, 0.0]);
        assert!(sched.boundary().contains(sched.bodies()[0].position));
        Ok(())
    }

    #[test]
    fn contacts_at_time_zero_fire() -> Result<()> {
        // Sitting on the left wall, heading out.
        let bodies = vec![Body::new([-256.0, 0.0], [-2.0, 0.0])?];
        let mut sched = CollisionScheduler::new(bodies, EngineConfig::default(), Reflect)?;
        let ev = sched.step()?.expect("wall contact at t=0");
        assert_eq!(ev.time_f64(), 0.0);
        assert_eq!(ev.b, Participant::Boundary(Wall::Left));
        assert_eq!(sched.bodies()[0].velocity, [2.0, 0.0]);
        Ok(())
    }

    #[test]
    fn resolved_pair_is_not_refired_at_same_instant() -> Result<()> {
        let bodies = vec![
            Body::new([-1.0, 0.0], [1.0, 0.0])?,
            Body::new([1.0, 0.0], [-1.0, 0.0])?,
        ];
        let mut sched = CollisionScheduler::new(bodies, open_space(), Ignore)?;
        sched.advance(5.0)?;
        assert_eq!(sched.events_processed(), 1);
        assert_eq!(sched.positions(), vec![[4.0, 0.0], [-4.0, 0.0]]);
        Ok(())
    }

    #[test]
    fn unknown_body_lookup_errors() -> Result<()> {
        let sched = CollisionScheduler::new(Vec::new(), EngineConfig::default(), Ignore)?;
        assert!(matches!(sched.body(BodyId(3)), Err(Error::UnknownBody(3))));
        Ok(())
    }
}
