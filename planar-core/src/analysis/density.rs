use std::fmt::{self, Display};
use std::ops::{BitAnd, BitOr, Not};

use derive_more::Deref;

use crate::{
    bool1d::SubSetR1,
    bool2d::{
        shape::{Shape, SimpleShape},
        subset::SubSetR2,
    },
    jordan::JordanCurve,
    math::{
        angle::Angle,
        tol::{BOUNDARY_EPS, DENSITY_EPS},
    },
    r2::R2,
};

/// Directions (in turns, within `[0, 1]`) along which a set is locally present around a point.
/// Its measure is the point's density: 0 outside, 1 inside, in between on the boundary (1/2
/// along smooth stretches, a corner's angle at vertices).
#[derive(Clone, Debug, Deref)]
pub struct Density(SubSetR1);

impl Density {
    pub fn zero() -> Self {
        Density(SubSetR1::empty())
    }

    pub fn one() -> Self {
        Density(SubSetR1::closed(0., 1.))
    }

    /// Directions sweeping counter-clockwise from `from` to `to`.
    pub fn sector(from: Angle, to: Angle) -> Self {
        let a = from.normalized().to_turns();
        let b = to.normalized().to_turns();
        if (a - b).abs() <= 1e-12 {
            Density::zero()
        } else if a < b {
            Density(SubSetR1::closed(a, b))
        } else {
            Density(SubSetR1::closed(a, 1.).union(&SubSetR1::closed(0., b)))
        }
    }

    /// Half-plane to the left of `tangent`.
    pub fn half(tangent: Angle) -> Self {
        Density::sector(tangent, tangent + Angle::HALF)
    }

    pub fn value(&self) -> f64 {
        self.0.measure().clamp(0., 1.)
    }

    pub fn is_zero(&self) -> bool {
        self.value() <= DENSITY_EPS
    }

    pub fn is_one(&self) -> bool {
        self.value() >= 1. - DENSITY_EPS
    }

    pub fn contains_direction(&self, direction: Angle) -> bool {
        self.0.contains(direction.normalized().to_turns())
    }
}

impl Not for Density {
    type Output = Density;
    fn not(self) -> Density {
        Density(&SubSetR1::closed(0., 1.) - &self.0)
    }
}

impl BitAnd for Density {
    type Output = Density;
    fn bitand(self, rhs: Density) -> Density {
        Density(self.0 & rhs.0)
    }
}

impl BitOr for Density {
    type Output = Density;
    fn bitor(self, rhs: Density) -> Density {
        Density(self.0 | rhs.0)
    }
}

impl PartialEq for Density {
    fn eq(&self, other: &Self) -> bool {
        (self.value() - other.value()).abs() <= DENSITY_EPS
    }
}

impl PartialEq<f64> for Density {
    fn eq(&self, other: &f64) -> bool {
        (self.value() - other).abs() <= DENSITY_EPS
    }
}

impl Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Density of the region `jordan` winds around, at `p`.
pub fn jordan_density(jordan: &JordanCurve, p: &R2<f64>) -> Density {
    let outside = || if jordan.orientation() > 0 { Density::zero() } else { Density::one() };
    if !p.is_finite() || !jordan.bbox().contains(p, BOUNDARY_EPS) {
        return outside();
    }
    if let Some((idx, t)) = jordan.locate(p) {
        let segments = jordan.segments();
        let n = segments.len();
        let segment = &segments[idx];
        let (arriving, leaving) = if p.distance(&segment.start()) <= BOUNDARY_EPS {
            (segments[(idx + n - 1) % n].direction(1.), segment.direction(0.))
        } else if p.distance(&segment.end()) <= BOUNDARY_EPS {
            (segment.direction(1.), segments[(idx + 1) % n].direction(0.))
        } else {
            let d = segment.direction(t);
            (d, d)
        };
        return Density::sector(Angle::of(leaving), Angle::of(arriving) + Angle::HALF);
    }
    let winding = jordan.winding(p).round();
    if jordan.orientation() > 0 {
        if winding >= 1. { Density::one() } else { Density::zero() }
    } else if winding <= -1. {
        Density::zero()
    } else {
        Density::one()
    }
}

impl SimpleShape {
    pub fn density(&self, p: &R2<f64>) -> Density {
        jordan_density(&self.jordan, p)
    }
}

impl Shape {
    pub fn density(&self, p: &R2<f64>) -> Density {
        match self {
            Shape::Simple(s) => s.density(p),
            Shape::Connected(c) => c.subshapes().iter().fold(Density::one(), |d, s| d & s.density(p)),
            Shape::Disjoint(d) => d.components().iter().fold(Density::zero(), |acc, c| acc | c.density(p)),
        }
    }
}

impl SubSetR2 {
    /// Density at `p`, evaluated without resolving the expression. Points and curves have
    /// density 0 everywhere.
    pub fn density(&self, p: &R2<f64>) -> Density {
        match self {
            SubSetR2::Empty | SubSetR2::Point(_) | SubSetR2::Curve(_) => Density::zero(),
            SubSetR2::Whole => Density::one(),
            SubSetR2::Shape(shape) => shape.density(p),
            SubSetR2::Not(inner) => !inner.density(p),
            SubSetR2::And(operands) => operands.iter().fold(Density::one(), |d, o| d & o.density(p)),
            SubSetR2::Or(operands) => operands.iter().fold(Density::zero(), |d, o| d | o.density(p)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn square() -> JordanCurve {
        JordanCurve::polygon(&[R2 { x: 0., y: 0. }, R2 { x: 2., y: 0. }, R2 { x: 2., y: 2. }, R2 { x: 0., y: 2. }])
            .unwrap()
    }

    #[test]
    fn sectors() {
        assert_eq!(Density::sector(Angle::ZERO, Angle::QUARTER), 0.25);
        assert_eq!(Density::sector(Angle::turns(0.75), Angle::QUARTER), 0.5);
        assert!(Density::sector(Angle::turns(0.75), Angle::QUARTER).contains_direction(Angle::ZERO));
        assert_eq!(Density::half(Angle::turns(0.3)), 0.5);
        assert!(Density::sector(Angle::QUARTER, Angle::QUARTER).is_zero());
        assert!((!Density::zero()).is_one());
        assert_eq!(!Density::sector(Angle::ZERO, Angle::QUARTER), 0.75);
    }

    #[test]
    fn square_densities() {
        let square = square();
        let at = |x: f64, y: f64| jordan_density(&square, &R2 { x, y });
        assert_eq!(at(1., 1.), 1.);
        assert_eq!(at(3., 1.), 0.);
        assert_eq!(at(1., 0.), 0.5);
        assert_eq!(at(0., 0.), 0.25);
        assert_eq!(at(2., 2.), 0.25);
        assert!(at(1., 0.).contains_direction(Angle::QUARTER));
        assert!(!at(1., 0.).contains_direction(Angle::turns(0.75)));
        assert_eq!(jordan_density(&square, &R2::at_infinity(Angle::ZERO)), 0.);

        let hole = square.reversed();
        let at = |x: f64, y: f64| jordan_density(&hole, &R2 { x, y });
        assert_eq!(at(1., 1.), 0.);
        assert_eq!(at(3., 1.), 1.);
        assert_eq!(at(1., 0.), 0.5);
        assert_eq!(at(0., 0.), 0.75);
        assert!(at(1., 0.).contains_direction(Angle::turns(0.75)));
        assert_eq!(jordan_density(&hole, &R2::at_infinity(Angle::HALF)), 1.);
    }

    #[test]
    fn expression_densities() {
        let a = SubSetR2::from(square());
        let p = R2 { x: 1., y: 0. };
        assert_eq!(SubSetR2::Whole.density(&p), 1.);
        assert_eq!((&a | &!&a).density(&p), 1.);
        assert_eq!((&a & &!&a).density(&p), 0.);
        assert_eq!((!&a).density(&R2 { x: 0., y: 0. }), 0.75);
        assert_eq!(SubSetR2::from(p).density(&p), 0.);
    }
}
