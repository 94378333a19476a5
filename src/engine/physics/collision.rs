use rapier3d::prelude::*;
use std::sync::Mutex;

/// Two bodies started touching during a physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub body1: RigidBodyHandle,
    pub body2: RigidBodyHandle,
    /// Closing speed along the contact normal at the moment of contact (m/s, >= 0)
    pub impact_velocity: Real,
}

impl ContactEvent {
    /// Check whether a body takes part in this contact
    pub fn involves(&self, body: RigidBodyHandle) -> bool {
        self.body1 == body || self.body2 == body
    }
}

/// Queue for storing contact events during physics steps
///
/// Events pile up across every sub-step of a frame and are drained by the caller
/// once the step is over, so no game code ever runs inside rapier's callbacks.
pub struct CollisionEventQueue {
    events: Mutex<Vec<ContactEvent>>,
}

impl CollisionEventQueue {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::with_capacity(32)), // Pre-allocate for common case
        }
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&self) -> Vec<ContactEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    fn push(&self, event: ContactEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Default for CollisionEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Relative speed of the two bodies along the contact normal
///
/// Uses the first contact point of the first non-empty manifold. Falls back to the
/// bodies' linear velocities when the manifold has no points yet.
pub fn impact_velocity(
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    contact_pair: &ContactPair,
) -> Real {
    let Some(collider1) = colliders.get(contact_pair.collider1) else {
        return 0.0;
    };
    let Some(collider2) = colliders.get(contact_pair.collider2) else {
        return 0.0;
    };
    let Some(manifold) = contact_pair
        .manifolds
        .iter()
        .find(|manifold| !manifold.points.is_empty())
        .or_else(|| contact_pair.manifolds.first())
    else {
        return 0.0;
    };

    // Normal is stored in collider1's local frame and points towards collider2
    let normal = collider1.position() * manifold.local_n1;
    let contact_point = manifold
        .points
        .first()
        .map(|contact| collider1.position() * contact.local_p1);

    let velocity = |collider: &Collider| -> Vector<Real> {
        let Some(body) = collider.parent().and_then(|handle| bodies.get(handle)) else {
            return Vector::zeros();
        };
        match contact_point {
            Some(point) => body.velocity_at_point(&point),
            None => *body.linvel(),
        }
    };

    (velocity(collider1) - velocity(collider2)).dot(&normal).abs()
}

// Implement rapier3d's EventHandler trait for our event queue
impl EventHandler for CollisionEventQueue {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let CollisionEvent::Started(h1, h2, flags) = event else {
            return;
        };
        if flags.contains(CollisionEventFlags::SENSOR) {
            return;
        }

        let parent = |handle: ColliderHandle| colliders.get(handle).and_then(|c| c.parent());
        let (Some(body1), Some(body2)) = (parent(h1), parent(h2)) else {
            return;
        };

        let impact_velocity = contact_pair
            .map(|pair| impact_velocity(bodies, colliders, pair))
            .unwrap_or(0.0);

        log::trace!(
            "Contact started between {:?} and {:?} at {:.3} m/s",
            body1,
            body2,
            impact_velocity
        );

        self.push(ContactEvent {
            body1,
            body2,
            impact_velocity,
        });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
        // Impact strength comes from contact velocities, not forces
    }
}
