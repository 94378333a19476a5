// Scene graph: the flat set of visual nodes the renderer draws every frame

use glam::{Mat4, Quat, Vec3, Vec4};
use std::collections::BTreeMap;

/// Handle to a node in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(u64);

/// Unit meshes every node is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Sphere of radius 1
    Sphere,
    /// Cube with side length 1
    Cube,
    /// 1x1 quad in the XZ plane facing +Y
    Plane,
}

impl MeshKind {
    pub const ALL: [MeshKind; 3] = [MeshKind::Sphere, MeshKind::Cube, MeshKind::Plane];
}

/// A visual node: a unit mesh placed, rotated and scaled in the world
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyNode {
    pub mesh: MeshKind,
    pub position: Vec3,
    pub orientation: Quat,
    /// Multiplies the unit mesh; a cube scaled (w, h, d) is a w x h x d box
    pub scale: Vec3,
    /// Base color (RGBA)
    pub color: Vec4,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl ProxyNode {
    /// Create a node at the origin with no rotation
    pub fn new(mesh: MeshKind, scale: Vec3) -> Self {
        Self {
            mesh,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale,
            color: Vec4::ONE,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    /// Get the model matrix for this node
    pub fn transform_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation, self.position)
    }
}

/// Insertion-ordered collection of scene nodes
#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<ProxyId, ProxyNode>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its handle
    pub fn insert(&mut self, node: ProxyNode) -> ProxyId {
        let id = ProxyId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node, returning it if it was present
    pub fn remove(&mut self, id: ProxyId) -> Option<ProxyNode> {
        self.nodes.remove(&id)
    }

    pub fn get(&self, id: ProxyId) -> Option<&ProxyNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ProxyId) -> Option<&mut ProxyNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: ProxyId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ProxyId, &ProxyNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_insert_remove() {
        let mut scene = Scene::new();
        let a = scene.insert(ProxyNode::new(MeshKind::Sphere, Vec3::ONE));
        let b = scene.insert(ProxyNode::new(MeshKind::Cube, Vec3::ONE));

        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);
        assert!(scene.remove(a).is_some());
        assert!(scene.remove(a).is_none());
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.insert(ProxyNode::new(MeshKind::Sphere, Vec3::ONE));
        scene.remove(a);
        let b = scene.insert(ProxyNode::new(MeshKind::Sphere, Vec3::ONE));
        assert_ne!(a, b);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut scene = Scene::new();
        let ids: Vec<_> = (0..5)
            .map(|i| scene.insert(ProxyNode::new(MeshKind::Cube, Vec3::splat(i as f32 + 1.0))))
            .collect();
        let seen: Vec<_> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, seen);
    }

    #[test]
    fn test_transform_applies_scale_then_rotation_then_translation() {
        let node = ProxyNode::new(MeshKind::Cube, Vec3::new(2.0, 1.0, 1.0))
            .with_orientation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
            .with_position(Vec3::new(0.0, 5.0, 0.0));

        // +X corner of the unit cube ends up 1 unit along -Z, lifted to y = 5
        let p = node.transform_matrix().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-5);
    }
}
