pub mod bbox;
pub mod jordan;
pub mod piecewise;
pub mod primitive;
pub mod r2;
pub mod segment;
pub mod transform;
