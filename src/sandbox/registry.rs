// Entity registry: the single owner of every spawned (body, proxy) pair

use super::factory::{RenderProxyFactory, ShapeKind};
use super::feedback::{CollisionFeedback, SubscriptionToken};
use super::panel::SpawnRequest;
use super::SandboxError;
use crate::core::math::{to_glam_quat, to_glam_vec3};
use crate::engine::physics::{PhysicsWorld, RigidBodyHandle};
use crate::engine::renderer::{ProxyId, Scene};

/// Identifies one spawned entity for its whole life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

/// A physics body paired with the proxy that draws it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub body: RigidBodyHandle,
    pub proxy: ProxyId,
    pub subscription: SubscriptionToken,
    pub shape: ShapeKind,
}

/// Spawned entities in creation order
///
/// Everything a spawn registers (body, proxy, collision subscription) is torn
/// down together, so neither half of a pair outlives the other.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    factory: RenderProxyFactory,
    entities: Vec<Entity>,
    next_id: u64,
}

impl EntityRegistry {
    pub fn new(factory: RenderProxyFactory) -> Self {
        Self {
            factory,
            entities: Vec::new(),
            next_id: 0,
        }
    }

    /// Create a body and its proxy, subscribe the body to collision feedback
    ///
    /// Invalid requests are rejected before anything is registered.
    pub fn spawn(
        &mut self,
        request: SpawnRequest,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        feedback: &mut CollisionFeedback,
    ) -> Result<EntityId, SandboxError> {
        let (descriptor, proxy) = self.factory.create(request.shape, request.position)?;

        let body = physics.add_body(&descriptor);
        let proxy = scene.insert(proxy);
        let subscription = feedback.subscribe(body);

        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            body,
            proxy,
            subscription,
            shape: request.shape,
        });

        log::debug!(
            "Spawned {} {:?} at ({:.2}, {:.2}, {:.2})",
            request.shape.name(),
            id,
            request.position.x,
            request.position.y,
            request.position.z
        );
        Ok(id)
    }

    /// Remove one entity; false if the id is unknown
    pub fn remove(
        &mut self,
        id: EntityId,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        feedback: &mut CollisionFeedback,
    ) -> bool {
        let Some(index) = self.entities.iter().position(|e| e.id == id) else {
            return false;
        };
        let entity = self.entities.remove(index);
        Self::destroy(&entity, physics, scene, feedback);
        true
    }

    /// Remove every entity, newest first; returns how many were removed
    pub fn clear(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        feedback: &mut CollisionFeedback,
    ) -> usize {
        let count = self.entities.len();
        while let Some(entity) = self.entities.pop() {
            Self::destroy(&entity, physics, scene, feedback);
        }
        if count > 0 {
            log::info!("Cleared {} bodies", count);
        }
        count
    }

    /// Copy every body's pose onto its proxy
    pub fn sync_all(&self, physics: &PhysicsWorld, scene: &mut Scene) {
        for entity in &self.entities {
            let (Some(pose), Some(node)) =
                (physics.body_isometry(entity.body), scene.get_mut(entity.proxy))
            else {
                continue;
            };
            node.position = to_glam_vec3(&pose.translation.vector);
            node.orientation = to_glam_quat(&pose.rotation);
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Iterate entities in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn destroy(
        entity: &Entity,
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        feedback: &mut CollisionFeedback,
    ) {
        // Unsubscribe first so no event is ever dispatched for a half-removed pair
        let unsubscribed = feedback.unsubscribe(entity.subscription);
        let body_removed = physics.remove_body(entity.body);
        let proxy_removed = scene.remove(entity.proxy).is_some();

        if !(unsubscribed && body_removed && proxy_removed) {
            log::warn!(
                "Entity {:?} was partially gone before removal (subscription: {}, body: {}, proxy: {})",
                entity.id,
                unsubscribed,
                body_removed,
                proxy_removed
            );
        }
    }
}
