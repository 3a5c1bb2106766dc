pub mod action;
pub mod actor;
pub mod collision;
pub mod peer;
pub mod step;
pub mod world;

pub(crate) const EDGE_EPSILON: f32 = 0.001;
