mod bounds;
pub mod graph;
pub mod model;
pub mod transform;
