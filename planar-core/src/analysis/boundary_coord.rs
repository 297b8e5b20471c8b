use crate::{jordan::JordanCurve, r2::R2};

/// Monotonic parameter ordering points around a closed boundary.
///
/// For Jordan curves this is the global parameter of the underlying [`PiecewiseCurve`]
/// (`segment index + local t` by default). Coordinates past the last knot wrap around:
/// `point(c + coord_period()) == point(c)`.
///
/// [`PiecewiseCurve`]: crate::piecewise::PiecewiseCurve
pub trait BoundaryCoord {
    /// Coordinate of the boundary point closest to `p`.
    fn coord(&self, p: &R2<f64>) -> f64;

    fn point(&self, c: f64) -> R2<f64>;

    /// A point between two coordinates, `c0 < c1`.
    fn midpoint(&self, c0: f64, c1: f64) -> R2<f64>;

    fn coord_period(&self) -> f64;
}

impl JordanCurve {
    fn wrap_coord(&self, c: f64) -> f64 {
        let first = self.curve().first_knot();
        first + (c - first).rem_euclid(self.coord_period())
    }
}

impl BoundaryCoord for JordanCurve {
    fn coord(&self, p: &R2<f64>) -> f64 {
        self.curve().closest(p).0
    }

    fn point(&self, c: f64) -> R2<f64> {
        self.curve().eval(self.wrap_coord(c))
    }

    fn midpoint(&self, c0: f64, c1: f64) -> R2<f64> {
        self.point((c0 + c1) / 2.)
    }

    fn coord_period(&self) -> f64 {
        self.curve().last_knot() - self.curve().first_knot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn square() {
        let square = JordanCurve::polygon(&[
            R2 { x: 0., y: 0. },
            R2 { x: 2., y: 0. },
            R2 { x: 2., y: 2. },
            R2 { x: 0., y: 2. },
        ])
        .unwrap();
        assert_eq!(square.coord_period(), 4.);
        assert_relative_eq!(square.coord(&R2 { x: 2., y: 1. }), 1.5, epsilon = 1e-9);
        assert_relative_eq!(square.point(2.5), R2 { x: 1., y: 2. }, epsilon = 1e-12);
        assert_relative_eq!(square.point(4.5), R2 { x: 1., y: 0. }, epsilon = 1e-12);
        assert_relative_eq!(square.midpoint(3., 5.), R2 { x: 0., y: 0. }, epsilon = 1e-12);
    }
}
