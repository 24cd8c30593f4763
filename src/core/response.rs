use crate::core::body::{Body, BodyId, DIM};
use crate::core::boundary::Wall;
use crate::core::event::{CollisionEvent, Participant};

/// View of a collision handed to the response at the instant of impact.
///
/// Positions and velocities of every body are readable; only the velocities of
/// the participating bodies are writable. Positions and revisions stay under
/// the scheduler's control.
#[derive(Debug)]
pub struct Impact<'a> {
    event: CollisionEvent,
    bodies: &'a mut [Body],
}

impl<'a> Impact<'a> {
    pub(crate) fn new(event: CollisionEvent, bodies: &'a mut [Body]) -> Self {
        Self { event, bodies }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.event.time_f64()
    }

    #[inline]
    pub fn event(&self) -> &CollisionEvent {
        &self.event
    }

    #[inline]
    pub fn participants(&self) -> [Participant; 2] {
        self.event.participants()
    }

    /// The boundary edge involved, if this is a body-wall collision.
    pub fn wall(&self) -> Option<Wall> {
        self.participants().into_iter().find_map(|p| match p {
            Participant::Boundary(w) => Some(w),
            Participant::Body(_) => None,
        })
    }

    /// Read any body in the arena.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Mutable velocity of a participating body; `None` for the boundary or bystanders.
    pub fn velocity_mut(&mut self, id: BodyId) -> Option<&mut [f64; DIM]> {
        if !self.event.involves(id) {
            return None;
        }
        self.bodies.get_mut(id.index()).map(|b| &mut b.velocity)
    }
}

/// Physical response to a resolved collision.
///
/// Runs synchronously inside `CollisionScheduler::step`. Any
/// `FnMut(&mut Impact<'_>)` closure is a response.
pub trait CollisionResponse {
    fn respond(&mut self, impact: &mut Impact<'_>);
}

impl<F> CollisionResponse for F
where
    F: FnMut(&mut Impact<'_>),
{
    fn respond(&mut self, impact: &mut Impact<'_>) {
        self(impact)
    }
}

/// Leave velocities untouched; bodies pass through each other and the walls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

impl CollisionResponse for Ignore {
    fn respond(&mut self, _impact: &mut Impact<'_>) {}
}

/// Scale every participating body's velocity by `factor`.
///
/// The default factor of `-0.5` reverses and halves the velocity on impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping {
    pub factor: f64,
}

impl Default for Damping {
    fn default() -> Self {
        Self { factor: -0.5 }
    }
}

impl CollisionResponse for Damping {
    fn respond(&mut self, impact: &mut Impact<'_>) {
        let ids: Vec<BodyId> = impact.event().bodies().collect();
        for id in ids {
            if let Some(v) = impact.velocity_mut(id) {
                v.iter_mut().for_each(|c| *c *= self.factor);
            }
        }
    }
}

/// Elastic response for equal point masses.
///
/// Walls mirror the normal velocity component; body pairs exchange velocities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reflect;

impl CollisionResponse for Reflect {
    fn respond(&mut self, impact: &mut Impact<'_>) {
        match impact.participants() {
            [Participant::Body(i), Participant::Body(j)] => {
                let (Some(vi), Some(vj)) = (
                    impact.body(i).map(|b| b.velocity),
                    impact.body(j).map(|b| b.velocity),
                ) else {
                    return;
                };
                if let Some(v) = impact.velocity_mut(i) {
                    *v = vj;
                }
                if let Some(v) = impact.velocity_mut(j) {
                    *v = vi;
                }
            }
            [Participant::Body(i), Participant::Boundary(wall)]
            | [Participant::Boundary(wall), Participant::Body(i)] => {
                if let Some(v) = impact.velocity_mut(i) {
                    let k = wall.axis().index();
                    v[k] = -v[k];
                }
            }
            [Participant::Boundary(_), Participant::Boundary(_)] => {}
        }
    }
}
