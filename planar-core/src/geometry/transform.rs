use std::ops::Neg;

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{
    bool2d::{
        shape::{shape_from_simples, ConnectedShape, DisjointShape, Shape, SimpleShape},
        subset::SubSetR2,
    },
    jordan::JordanCurve,
    math::angle::Angle,
    piecewise::PiecewiseCurve,
    r2::R2,
    segment::Segment,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Translate(R2<f64>),
    Scale(f64),
    ScaleXY(R2<f64>),
    Rotate(Angle),
}

use Transform::{Rotate, Scale, ScaleXY, Translate};

impl Transform {
    /// Linear part; identity for translations.
    pub fn matrix(&self) -> Matrix2<f64> {
        match self {
            Translate(_) => Matrix2::identity(),
            Scale(s) => Matrix2::new(*s, 0., 0., *s),
            ScaleXY(s) => Matrix2::new(s.x, 0., 0., s.y),
            Rotate(a) => {
                let (cos, sin) = (a.cos(), a.sin());
                Matrix2::new(cos, -sin, sin, cos)
            }
        }
    }

    pub fn apply(&self, p: &R2<f64>) -> R2<f64> {
        match self {
            Translate(v) => *p + *v,
            _ => {
                let v = self.matrix() * Vector2::new(p.x, p.y);
                R2 { x: v.x, y: v.y }
            }
        }
    }

    /// Negative when the transform mirrors the plane, flipping curve orientations.
    pub fn determinant(&self) -> f64 {
        self.matrix().determinant()
    }
}

impl Neg for Transform {
    type Output = Transform;
    fn neg(self) -> Transform {
        match self {
            Translate(v) => Translate(-v),
            Scale(s) => Scale(1. / s),
            ScaleXY(s) => ScaleXY(R2 { x: 1. / s.x, y: 1. / s.y }),
            Rotate(a) => Rotate(-a),
        }
    }
}

pub trait CanTransform {
    type Output;
    fn transform(&self, transform: &Transform) -> Self::Output;
}

/// In-place counterpart of [`CanTransform`], for curve containers.
pub trait TransformMut {
    fn transform_mut(&mut self, transform: &Transform);
}

impl CanTransform for R2<f64> {
    type Output = R2<f64>;
    fn transform(&self, transform: &Transform) -> R2<f64> {
        transform.apply(self)
    }
}

impl TransformMut for Segment {
    fn transform_mut(&mut self, transform: &Transform) {
        for p in self.ctrl_mut() {
            *p = transform.apply(p);
        }
    }
}

impl TransformMut for PiecewiseCurve {
    fn transform_mut(&mut self, transform: &Transform) {
        for segment in self.segments_mut() {
            segment.transform_mut(transform);
        }
    }
}

impl TransformMut for JordanCurve {
    fn transform_mut(&mut self, transform: &Transform) {
        self.curve_mut().transform_mut(transform);
    }
}

macro_rules! transform_by_clone {
    ($($t:ty),*) => {
        $(
            impl CanTransform for $t {
                type Output = $t;
                fn transform(&self, transform: &Transform) -> $t {
                    let mut transformed = self.clone();
                    transformed.transform_mut(transform);
                    transformed
                }
            }
        )*
    };
}

transform_by_clone!(Segment, PiecewiseCurve, JordanCurve);

impl CanTransform for SimpleShape {
    type Output = SimpleShape;
    fn transform(&self, transform: &Transform) -> SimpleShape {
        SimpleShape { jordan: self.jordan.transform(transform), boundary: self.boundary }
    }
}

/// Orientation-preserving transforms keep the grouping into components.
fn transform_grouped(shape: &Shape, transform: &Transform) -> Shape {
    match shape {
        Shape::Simple(s) => Shape::Simple(s.transform(transform)),
        Shape::Connected(c) => Shape::Connected(ConnectedShape::from_parts(
            c.subshapes().iter().map(|s| s.transform(transform)).collect(),
        )),
        Shape::Disjoint(d) => Shape::Disjoint(DisjointShape::from_parts(
            d.components().iter().map(|c| transform_grouped(c, transform)).collect(),
        )),
    }
}

impl CanTransform for Shape {
    type Output = SubSetR2;
    /// Mirroring transforms turn holes into outer curves and back, so composite shapes are
    /// regrouped.
    fn transform(&self, transform: &Transform) -> SubSetR2 {
        match self {
            Shape::Simple(s) => s.transform(transform).into(),
            _ if transform.determinant() < 0. => {
                shape_from_simples(self.simples().into_iter().map(|s| s.transform(transform)).collect())
            }
            _ => transform_grouped(self, transform).into(),
        }
    }
}

impl CanTransform for SubSetR2 {
    type Output = SubSetR2;
    fn transform(&self, transform: &Transform) -> SubSetR2 {
        match self {
            SubSetR2::Empty | SubSetR2::Whole => self.clone(),
            SubSetR2::Point(p) => SubSetR2::Point(p.transform(transform)),
            SubSetR2::Curve(c) => SubSetR2::Curve(c.transform(transform)),
            SubSetR2::Shape(shape) => shape.transform(transform),
            SubSetR2::Not(inner) => inner.transform(transform).invert(),
            SubSetR2::And(operands) => SubSetR2::intersect(operands.iter().map(|o| o.transform(transform))),
            SubSetR2::Or(operands) => SubSetR2::unite(operands.iter().map(|o| o.transform(transform))),
        }
    }
}

impl SubSetR2 {
    pub fn translate(&self, v: impl Into<R2<f64>>) -> SubSetR2 {
        self.transform(&Translate(v.into()))
    }

    pub fn scale(&self, s: f64) -> SubSetR2 {
        self.transform(&Scale(s))
    }

    pub fn scale_xy(&self, s: impl Into<R2<f64>>) -> SubSetR2 {
        self.transform(&ScaleXY(s.into()))
    }

    /// Counter-clockwise, about the origin.
    pub fn rotate(&self, angle: Angle) -> SubSetR2 {
        self.transform(&Rotate(angle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn r2(x: f64, y: f64) -> R2<f64> {
        R2 { x, y }
    }

    fn square() -> JordanCurve {
        JordanCurve::polygon(&[r2(0., 0.), r2(2., 0.), r2(2., 2.), r2(0., 2.)]).unwrap()
    }

    #[test]
    fn points() {
        let p = r2(1., 2.);
        assert_eq!(p.transform(&Translate(r2(1., -1.))), r2(2., 1.));
        assert_eq!(p.transform(&Scale(2.)), r2(2., 4.));
        assert_eq!(p.transform(&ScaleXY(r2(-1., 3.))), r2(-1., 6.));
        assert_eq!(p.transform(&Rotate(Angle::QUARTER)), r2(-2., 1.));
        assert_relative_eq!(p.transform(&Rotate(Angle::degrees(30.))).norm(), 5f64.sqrt(), epsilon = 1e-12);
        for t in [Translate(r2(3., 4.)), Scale(4.), ScaleXY(r2(2., -0.5)), Rotate(Angle::degrees(17.))] {
            assert_relative_eq!(p.transform(&t).transform(&-t), p, epsilon = 1e-12);
        }
    }

    #[test]
    fn determinants() {
        assert_eq!(Translate(r2(3., 4.)).determinant(), 1.);
        assert_eq!(Scale(3.).determinant(), 9.);
        assert_eq!(ScaleXY(r2(-1., 2.)).determinant(), -2.);
        assert_relative_eq!(Rotate(Angle::degrees(40.)).determinant(), 1., epsilon = 1e-12);
    }

    #[test]
    fn curves() {
        let mut square = square();
        let moved = square.transform(&Translate(r2(1., 1.)));
        assert_eq!(moved.vertices(), vec![r2(1., 1.), r2(3., 1.), r2(3., 3.), r2(1., 3.)]);
        square.transform_mut(&Scale(0.5));
        assert_relative_eq!(square.area(), 1.);
        let mirrored = square.transform(&ScaleXY(r2(-1., 1.)));
        assert_relative_eq!(mirrored.area(), -1.);
    }

    #[test]
    fn subsets() {
        let set = SubSetR2::from(square());
        assert!(SubSetR2::Empty.translate((1., 1.)).is_empty());
        assert!(SubSetR2::Whole.rotate(Angle::QUARTER).is_whole());
        assert_relative_eq!(set.scale(3.).area().unwrap(), 36.);
        assert_relative_eq!(set.scale_xy((2., 0.5)).area().unwrap(), 4.);
        let rotated = set.rotate(Angle::QUARTER);
        let SubSetR2::Shape(Shape::Simple(s)) = &rotated else { panic!("expected simple shape, got {}", rotated) };
        assert_eq!(s.jordan, JordanCurve::polygon(&[r2(0., 0.), r2(0., 2.), r2(-2., 2.), r2(-2., 0.)]).unwrap());
        assert_eq!(set.translate((1., 0.)).translate((-1., 0.)), set);
        let lazy = !&set | &SubSetR2::from(r2(5., 5.));
        let expected = !&set.translate((1., 0.)) | SubSetR2::from(r2(6., 5.));
        assert!(lazy.translate((1., 0.)).same(&expected));
    }
}
