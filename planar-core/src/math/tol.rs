//! Tolerances used at classification boundaries.

/// Two curve parameters closer than this are the same parameter.
pub const PARAM_EPS: f64 = 1e-9;

/// Two control points closer than this (per coordinate) are the same point.
pub const POINT_EPS: f64 = 1e-9;

/// Intersection points closer than this are merged into one graph node.
pub const MERGE_THRESHOLD: f64 = 1e-7;

/// Points this close to a curve are on its boundary.
pub const BOUNDARY_EPS: f64 = 1e-7;

/// Densities within this of 0 or 1 are treated as exactly 0 or 1.
pub const DENSITY_EPS: f64 = 1e-6;
