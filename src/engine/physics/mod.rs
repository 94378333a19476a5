// Physics system using rapier3d

mod body;
mod collision;
mod world;

pub use body::{BodyDescriptor, BodyShape, ContactMaterial, RigidBodyHandle};
pub use collision::ContactEvent;
pub use world::{PhysicsWorld, WorldSettings};
