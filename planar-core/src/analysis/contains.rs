use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;

use crate::{
    analysis::intersect::intersect,
    bool2d::{
        shape::{Shape, SimpleShape},
        subset::SubSetR2,
    },
    error::Error,
    jordan::JordanCurve,
    math::tol::{BOUNDARY_EPS, DENSITY_EPS, PARAM_EPS},
    piecewise::PiecewiseCurve,
    r2::R2,
};

pub trait Contains<O> {
    fn contains(&self, o: &O) -> bool;
}

impl Contains<R2<f64>> for SimpleShape {
    fn contains(&self, p: &R2<f64>) -> bool {
        if p.is_finite() && self.jordan.locate(p).is_some() {
            self.boundary
        } else {
            self.density(p).is_one()
        }
    }
}

impl Contains<R2<f64>> for Shape {
    fn contains(&self, p: &R2<f64>) -> bool {
        match self {
            Shape::Simple(s) => s.contains(p),
            Shape::Connected(c) => c.subshapes().iter().all(|s| s.contains(p)),
            Shape::Disjoint(d) => d.components().iter().any(|c| c.contains(p)),
        }
    }
}

impl Contains<R2<f64>> for SubSetR2 {
    fn contains(&self, p: &R2<f64>) -> bool {
        match self {
            SubSetR2::Empty => false,
            SubSetR2::Whole => true,
            SubSetR2::Point(q) => q.distance(p) <= BOUNDARY_EPS,
            SubSetR2::Curve(c) => c.closest(p).1 <= BOUNDARY_EPS,
            SubSetR2::Shape(shape) => shape.contains(p),
            SubSetR2::Not(inner) => !inner.contains(p),
            SubSetR2::And(operands) => operands.iter().all(|o| o.contains(p)),
            SubSetR2::Or(operands) => operands.iter().any(|o| o.contains(p)),
        }
    }
}

impl SubSetR2 {
    pub fn contains_point(&self, p: &R2<f64>) -> bool {
        self.contains(p)
    }

    /// `p` is in the closure of this set.
    fn touches(&self, p: &R2<f64>) -> bool {
        self.contains(p) || self.density(p).value() > DENSITY_EPS
    }

    /// Whether `other ⊆ self`. Boundary points of `other` may lie on the boundary of `self`.
    pub fn contains_subset(&self, other: &SubSetR2) -> Result<bool, Error> {
        if let SubSetR2::Not(inner) = self {
            if let SubSetR2::Point(q) = inner.as_ref() {
                return Ok(!other.contains(q));
            }
        }
        match (self, other) {
            (_, SubSetR2::Empty) | (SubSetR2::Whole, _) => Ok(true),
            (SubSetR2::Empty, _) => Ok(other.clean()?.is_empty()),
            (_, SubSetR2::Whole) => Ok(self.clean()?.is_whole()),
            (SubSetR2::And(operands), _) => all(operands.iter(), |o| o.contains_subset(other)),
            (SubSetR2::Shape(Shape::Connected(c)), _) => {
                all(c.subshapes().iter(), |s| SubSetR2::from(s.clone()).contains_subset(other))
            }
            (_, SubSetR2::Or(operands)) => all(operands.iter(), |o| self.contains_subset(o)),
            (_, SubSetR2::Shape(Shape::Disjoint(d))) => {
                all(d.components().iter(), |c| self.contains_subset(&SubSetR2::Shape(c.clone())))
            }
            (_, SubSetR2::Point(p)) => Ok(self.contains(p)),
            (_, SubSetR2::Curve(curve)) => {
                let samples = samples(curve, &self.jordans())?;
                Ok(samples.iter().all(|p| self.touches(p)))
            }
            (SubSetR2::Point(q), _) => Ok(matches!(other, SubSetR2::Point(p) if p.distance(q) <= BOUNDARY_EPS)),
            (SubSetR2::Curve(_), SubSetR2::Shape(_)) => Ok(false),
            (SubSetR2::Shape(Shape::Simple(a)), SubSetR2::Shape(Shape::Simple(b))) => simple_contains(a, b),
            _ => difference_is_empty(other, self),
        }
    }
}

/// `b \ a` has no area.
fn difference_is_empty(b: &SubSetR2, a: &SubSetR2) -> Result<bool, Error> {
    let difference = SubSetR2::intersect([b.clone(), a.invert()]);
    debug!("checking emptiness of {}", difference);
    Ok(difference.without_null_leaves().clean()?.is_empty())
}

fn all<'a, T: 'a>(
    mut items: impl Iterator<Item = &'a T>,
    mut f: impl FnMut(&'a T) -> Result<bool, Error>,
) -> Result<bool, Error> {
    items.try_fold(true, |acc, item| Ok(acc && f(item)?))
}

/// Points along `curve` at its knots, where it meets `against`, and midway between
/// consecutive such parameters.
fn samples(curve: &PiecewiseCurve, against: &[&JordanCurve]) -> Result<Vec<R2<f64>>, Error> {
    let mut cuts: Vec<f64> = curve.knots().to_vec();
    for jordan in against {
        let hits = intersect(curve, jordan.curve())?;
        cuts.extend(hits.iter().map(|(t, _)| *t));
    }
    let cuts: Vec<f64> = cuts
        .into_iter()
        .sorted_by_key(|t| OrderedFloat(*t))
        .dedup_by(|a, b| (a - b).abs() <= PARAM_EPS)
        .collect();
    let mut points: Vec<R2<f64>> = cuts.iter().map(|t| curve.eval(*t)).collect();
    points.extend(cuts.iter().tuple_windows().map(|(a, b)| curve.eval((a + b) / 2.)));
    Ok(points)
}

/// `b ⊆ a`, for simple shapes, from their orientations and where `b`'s boundary lies.
fn simple_contains(a: &SimpleShape, b: &SimpleShape) -> Result<bool, Error> {
    match (a.is_bounded(), b.is_bounded()) {
        (true, true) => {
            let sa = SubSetR2::from(a.clone());
            Ok(samples(b.jordan.curve(), &[&a.jordan])?.iter().all(|p| sa.touches(p)))
        }
        (true, false) => Ok(false),
        (false, true) => difference_is_empty(&SubSetR2::from(b.clone()), &SubSetR2::from(a.clone())),
        (false, false) => simple_contains(&b.invert(), &a.invert()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{piecewise::PiecewiseCurve, segment::Segment};
    use test_log::test;

    fn square(x0: f64, y0: f64, side: f64) -> SimpleShape {
        let v = |x: f64, y: f64| R2 { x: x0 + x * side, y: y0 + y * side };
        SimpleShape::new(JordanCurve::polygon(&[v(0., 0.), v(1., 0.), v(1., 1.), v(0., 1.)]).unwrap())
    }

    #[test]
    fn points() {
        let s = square(0., 0., 2.);
        assert!(s.contains(&R2 { x: 1., y: 1. }));
        assert!(s.contains(&R2 { x: 0., y: 1. }));
        assert!(!s.contains(&R2 { x: 3., y: 1. }));
        assert!(!SimpleShape::open(s.jordan.clone()).contains(&R2 { x: 0., y: 1. }));
        let inverse = s.invert();
        assert!(!inverse.contains(&R2 { x: 0., y: 1. }));
        assert!(inverse.contains(&R2 { x: 3., y: 1. }));
        let set = SubSetR2::from(s) - SubSetR2::from(R2 { x: 1., y: 1. });
        assert!(!set.contains_point(&R2 { x: 1., y: 1. }));
        assert!(set.contains_point(&R2 { x: 1.5, y: 1. }));
    }

    #[test]
    fn simple_shapes() {
        let big = SubSetR2::from(square(0., 0., 4.));
        let small = SubSetR2::from(square(1., 1., 2.));
        let edge = SubSetR2::from(square(0., 0., 2.));
        let apart = SubSetR2::from(square(5., 5., 1.));
        assert!(big.contains_subset(&small).unwrap());
        assert!(big.contains_subset(&edge).unwrap());
        assert!(!small.contains_subset(&big).unwrap());
        assert!(!big.contains_subset(&apart).unwrap());
        assert!((!&small).contains_subset(&apart).unwrap());
        assert!(!(!&small).contains_subset(&big).unwrap());
        assert!((!&small).contains_subset(&!&big).unwrap());
        assert!(!(!&big).contains_subset(&!&small).unwrap());
    }

    #[test]
    fn points_and_curves() {
        let big = SubSetR2::from(square(0., 0., 4.));
        let inside = PiecewiseCurve::new(vec![Segment::line(R2 { x: 1., y: 1. }, R2 { x: 4., y: 3. })]).unwrap();
        let crossing = PiecewiseCurve::new(vec![Segment::line(R2 { x: 1., y: 1. }, R2 { x: 5., y: 3. })]).unwrap();
        assert!(big.contains_subset(&SubSetR2::from(R2 { x: 4., y: 0. })).unwrap());
        assert!(big.contains_subset(&SubSetR2::from(inside)).unwrap());
        assert!(!big.contains_subset(&SubSetR2::from(crossing)).unwrap());
        assert!(big.contains_subset(&SubSetR2::Empty).unwrap());
        assert!(!big.contains_subset(&SubSetR2::Whole).unwrap());
        assert!(SubSetR2::Whole.contains_subset(&big).unwrap());
        let punctured = !SubSetR2::from(R2 { x: 9., y: 9. });
        assert!(punctured.contains_subset(&big).unwrap());
    }

    #[test]
    fn composite_sets() {
        let big = SubSetR2::from(square(0., 0., 4.));
        let a = SubSetR2::from(square(0., 0., 1.));
        let b = SubSetR2::from(square(2., 2., 1.));
        assert!(big.contains_subset(&(&a | &b)).unwrap());
        assert!(!(&a | &b).contains_subset(&big).unwrap());
        assert!((&a | &b).contains_subset(&a).unwrap());
        let overlap = SubSetR2::from(square(0.5, 0.5, 2.));
        assert!(overlap.contains_subset(&(&overlap & &big)).unwrap());
        assert!(!(&overlap & &big).contains_subset(&a).unwrap());
    }
}
