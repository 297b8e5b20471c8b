pub mod boundary_coord;
pub mod contains;
pub mod density;
pub mod edge;
pub mod graph;
pub mod intersect;
pub mod node;
