use crate::core::body::{Body, BodyId};
use crate::core::boundary::Wall;
use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// One side of a collision: a real body, or an edge of the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    Body(BodyId),
    Boundary(Wall),
}

impl Participant {
    #[inline]
    pub fn body(self) -> Option<BodyId> {
        match self {
            Participant::Body(id) => Some(id),
            Participant::Boundary(_) => None,
        }
    }

    #[inline]
    pub fn is_boundary(self) -> bool {
        matches!(self, Participant::Boundary(_))
    }

    #[inline]
    fn order_key(self) -> (u8, usize) {
        match self {
            Participant::Body(id) => (0, id.index()),
            Participant::Boundary(w) => (1, w as usize),
        }
    }
}

/// A scheduled collision in the pending heap.
///
/// - `time`: absolute event time (finite, non-NaN).
/// - `a`, `b`: participants; never both boundary.
/// - `rev_a`, `rev_b`: revision snapshots for invalidation; `None` for the boundary.
///
/// Tie-breaking at equal times prefers body-body events over body-wall events,
/// then lower participant ids, so replay is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub time: NotNan<f64>,
    pub a: Participant,
    pub b: Participant,
    pub rev_a: Option<u64>,
    pub rev_b: Option<u64>,
}

impl CollisionEvent {
    /// Create a new event, validating the time and the participant/snapshot pairing.
    pub fn new(
        time: f64,
        a: Participant,
        rev_a: Option<u64>,
        b: Participant,
        rev_b: Option<u64>,
    ) -> Result<Self> {
        if a.is_boundary() && b.is_boundary() {
            return Err(Error::BoundaryPair);
        }
        if !time.is_finite() {
            return Err(Error::InvalidParam("event time must be finite".into()));
        }
        if a.is_boundary() == rev_a.is_some() || b.is_boundary() == rev_b.is_some() {
            return Err(Error::InvalidParam(
                "revision snapshots must be present exactly for body participants".into(),
            ));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        Ok(Self {
            time,
            a,
            b,
            rev_a,
            rev_b,
        })
    }

    /// Event between two bodies, snapshotting their current revisions.
    pub fn between(time: f64, i: BodyId, bi: &Body, j: BodyId, bj: &Body) -> Result<Self> {
        Self::new(
            time,
            Participant::Body(i),
            Some(bi.revision()),
            Participant::Body(j),
            Some(bj.revision()),
        )
    }

    /// Event between a body and a boundary edge.
    pub fn against_wall(time: f64, i: BodyId, bi: &Body, wall: Wall) -> Result<Self> {
        Self::new(
            time,
            Participant::Body(i),
            Some(bi.revision()),
            Participant::Boundary(wall),
            None,
        )
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }

    #[inline]
    pub fn participants(&self) -> [Participant; 2] {
        [self.a, self.b]
    }

    /// Body participants of this event, in order.
    pub fn bodies(&self) -> impl Iterator<Item = BodyId> {
        self.participants().into_iter().filter_map(Participant::body)
    }

    #[inline]
    pub fn involves(&self, id: BodyId) -> bool {
        self.bodies().any(|b| b == id)
    }

    /// Whether every body snapshot still matches the arena. Boundary sides are always current.
    pub fn is_current(&self, bodies: &[Body]) -> bool {
        snapshot_matches(self.a, self.rev_a, bodies) && snapshot_matches(self.b, self.rev_b, bodies)
    }

    #[inline]
    fn kind_rank(&self) -> u8 {
        u8::from(self.a.is_boundary() || self.b.is_boundary())
    }
}

fn snapshot_matches(p: Participant, snapshot: Option<u64>, bodies: &[Body]) -> bool {
    match (p, snapshot) {
        (Participant::Boundary(_), _) => true,
        (Participant::Body(id), Some(rev)) => bodies
            .get(id.index())
            .is_some_and(|b| b.revision() == rev),
        (Participant::Body(_), None) => false,
    }
}

impl Ord for CollisionEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
            .then_with(|| self.a.order_key().cmp(&other.a.order_key()))
            .then_with(|| self.b.order_key().cmp(&other.b.order_key()))
            // Final tie-breaker on snapshots to ensure a total order.
            .then_with(|| (self.rev_a, self.rev_b).cmp(&(other.rev_a, other.rev_b)))
    }
}

impl PartialOrd for CollisionEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
