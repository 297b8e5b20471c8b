use std::{
    fmt::{self, Display},
    ops::{Add, BitAnd, BitOr, BitXor, Mul, Neg, Not, Sub},
};

use approx::AbsDiffEq;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    bool2d::shape::{Shape, SimpleShape},
    error::{Error, GeometryError, ShapeError},
    jordan::JordanCurve,
    math::tol::POINT_EPS,
    piecewise::PiecewiseCurve,
    r2::R2,
};

/// Subset of the plane, either resolved (a point, a curve, a shape, or one of the two trivial
/// sets) or a lazy boolean expression over other subsets.
///
/// Operators build expressions without touching geometry; [`SubSetR2::clean`] resolves them.
/// Equality compares simplified expressions structurally, so `a == b` can miss equalities that
/// only show after cleaning both sides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum SubSetR2 {
    Empty,
    Whole,
    Point(R2<f64>),
    Curve(PiecewiseCurve),
    Shape(Shape),
    Not(Box<SubSetR2>),
    And(Vec<SubSetR2>),
    Or(Vec<SubSetR2>),
}

pub const EMPTY: SubSetR2 = SubSetR2::Empty;
pub const WHOLE: SubSetR2 = SubSetR2::Whole;

use SubSetR2::*;

impl SubSetR2 {
    pub fn point(p: impl Into<R2<f64>>) -> Result<Self, ShapeError> {
        let p = p.into();
        if !p.is_finite() {
            return Err(ShapeError::NonFinitePoint(p.to_string()));
        }
        Ok(Point(p))
    }

    /// Structurally empty; lazy expressions that evaluate to nothing aren't, until cleaned.
    pub fn is_empty(&self) -> bool {
        matches!(self, Empty)
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, Whole)
    }

    /// An unresolved boolean expression.
    pub fn is_lazy(&self) -> bool {
        matches!(self, Not(_) | And(_) | Or(_))
    }

    /// Complement, without simplifying beyond the trivial cases.
    pub fn invert(&self) -> SubSetR2 {
        match self {
            Empty => Whole,
            Whole => Empty,
            Not(inner) => (**inner).clone(),
            other => Not(Box::new(other.clone())),
        }
    }

    /// Union of `operands`: nested unions flattened, empty operands dropped, duplicates removed.
    pub fn unite(operands: impl IntoIterator<Item = SubSetR2>) -> SubSetR2 {
        let mut flat = vec![];
        for operand in operands {
            match operand {
                Empty => {}
                Whole => return Whole,
                Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        collect(flat, Or, Empty)
    }

    /// Intersection of `operands`, normalized like [`SubSetR2::unite`].
    pub fn intersect(operands: impl IntoIterator<Item = SubSetR2>) -> SubSetR2 {
        let mut flat = vec![];
        for operand in operands {
            match operand {
                Whole => {}
                Empty => return Empty,
                And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        collect(flat, And, Whole)
    }

    pub fn difference(a: SubSetR2, b: SubSetR2) -> SubSetR2 {
        SubSetR2::intersect([a, b.invert()])
    }

    pub fn xor(a: SubSetR2, b: SubSetR2) -> SubSetR2 {
        SubSetR2::unite([
            SubSetR2::intersect([a.clone(), b.invert()]),
            SubSetR2::intersect([a.invert(), b]),
        ])
    }

    /// Structural equality: same variant, same operands in the same order, leaves compared
    /// geometrically.
    pub fn same(&self, other: &SubSetR2) -> bool {
        match (self, other) {
            (Empty, Empty) | (Whole, Whole) => true,
            (Point(a), Point(b)) => a.abs_diff_eq(b, POINT_EPS),
            (Curve(a), Curve(b)) => {
                a.len() == b.len() && a.segments().iter().zip(b.segments()).all(|(x, y)| x.approx_eq(y, POINT_EPS))
            }
            (Shape(a), Shape(b)) => a == b,
            (Not(a), Not(b)) => a.same(b),
            (And(a), And(b)) | (Or(a), Or(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y)),
            _ => false,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Empty => 0,
            Whole => 1,
            Point(_) => 2,
            Curve(_) => 3,
            Shape(_) => 4,
            Not(_) => 5,
            And(_) => 6,
            Or(_) => 7,
        }
    }

    /// Every curve bounding a shape somewhere in this expression.
    pub fn jordans(&self) -> Vec<&JordanCurve> {
        match self {
            Shape(shape) => shape.jordans(),
            Not(inner) => inner.jordans(),
            And(operands) | Or(operands) => operands.iter().flat_map(|o| o.jordans()).collect(),
            _ => vec![],
        }
    }

    /// Whether the expression has point or curve leaves.
    pub fn has_null_leaves(&self) -> bool {
        match self {
            Point(_) | Curve(_) => true,
            Not(inner) => inner.has_null_leaves(),
            And(operands) | Or(operands) => operands.iter().any(|o| o.has_null_leaves()),
            _ => false,
        }
    }

    /// Same expression with point and curve leaves replaced by the empty set, which leaves
    /// areas unchanged.
    pub fn without_null_leaves(&self) -> SubSetR2 {
        match self {
            Point(_) | Curve(_) => Empty,
            Not(inner) => inner.without_null_leaves().invert(),
            And(operands) => SubSetR2::intersect(operands.iter().map(|o| o.without_null_leaves())),
            Or(operands) => SubSetR2::unite(operands.iter().map(|o| o.without_null_leaves())),
            other => other.clone(),
        }
    }

    /// Area, resolving lazy expressions first. Points and curves have none; unbounded sets have
    /// an infinite one, except unbounded shapes, which report minus the area of their
    /// complement.
    pub fn area(&self) -> Result<f64, Error> {
        match self {
            Empty | Point(_) | Curve(_) => Ok(0.),
            Whole => Ok(f64::INFINITY),
            Shape(shape) => Ok(shape.area()),
            lazy => {
                let cleaned = lazy.without_null_leaves().clean()?;
                if cleaned.is_lazy() {
                    return Err(GeometryError::degenerate(format!("{} did not resolve", cleaned)).into());
                }
                cleaned.area()
            }
        }
    }
}

/// Deduplicates and orders `operands`, collapsing to `identity` or a lone operand.
fn collect(operands: Vec<SubSetR2>, ctor: fn(Vec<SubSetR2>) -> SubSetR2, identity: SubSetR2) -> SubSetR2 {
    let mut unique: Vec<SubSetR2> = vec![];
    for operand in operands {
        if !unique.iter().any(|u| u.same(&operand)) {
            unique.push(operand);
        }
    }
    let mut sorted: Vec<SubSetR2> = unique.into_iter().sorted_by_cached_key(|o| (o.rank(), o.to_string())).collect();
    match sorted.len() {
        0 => identity,
        1 => sorted.remove(0),
        _ => ctor(sorted),
    }
}

impl From<R2<f64>> for SubSetR2 {
    fn from(p: R2<f64>) -> Self {
        Point(p)
    }
}

impl From<PiecewiseCurve> for SubSetR2 {
    fn from(curve: PiecewiseCurve) -> Self {
        Curve(curve)
    }
}

impl From<Shape> for SubSetR2 {
    fn from(shape: Shape) -> Self {
        Shape(shape)
    }
}

impl From<SimpleShape> for SubSetR2 {
    fn from(shape: SimpleShape) -> Self {
        Shape(shape.into())
    }
}

impl From<JordanCurve> for SubSetR2 {
    fn from(jordan: JordanCurve) -> Self {
        SimpleShape::new(jordan).into()
    }
}

impl PartialEq for SubSetR2 {
    fn eq(&self, other: &Self) -> bool {
        self.simplify().same(&other.simplify())
    }
}

impl Display for SubSetR2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Empty => write!(f, "EmptyR2"),
            Whole => write!(f, "WholeR2"),
            Point(p) => write!(f, "{{{}}}", p),
            Curve(c) => write!(f, "{}", c),
            Shape(s) => write!(f, "{}", s),
            Not(inner) => write!(f, "NOT[{}]", inner),
            And(operands) => write!(f, "AND[{}]", operands.iter().join(", ")),
            Or(operands) => write!(f, "OR[{}]", operands.iter().join(", ")),
        }
    }
}

fn union(a: SubSetR2, b: SubSetR2) -> SubSetR2 {
    SubSetR2::unite([a, b])
}

fn intersection(a: SubSetR2, b: SubSetR2) -> SubSetR2 {
    SubSetR2::intersect([a, b])
}

macro_rules! binary_op {
    ($tr:ident, $method:ident, $f:path) => {
        impl $tr for SubSetR2 {
            type Output = SubSetR2;
            fn $method(self, rhs: SubSetR2) -> SubSetR2 {
                $f(self, rhs)
            }
        }
        impl $tr<&SubSetR2> for &SubSetR2 {
            type Output = SubSetR2;
            fn $method(self, rhs: &SubSetR2) -> SubSetR2 {
                $f(self.clone(), rhs.clone())
            }
        }
        impl $tr<&SubSetR2> for SubSetR2 {
            type Output = SubSetR2;
            fn $method(self, rhs: &SubSetR2) -> SubSetR2 {
                $f(self, rhs.clone())
            }
        }
        impl $tr<SubSetR2> for &SubSetR2 {
            type Output = SubSetR2;
            fn $method(self, rhs: SubSetR2) -> SubSetR2 {
                $f(self.clone(), rhs)
            }
        }
    };
}

binary_op!(BitOr, bitor, union);
binary_op!(Add, add, union);
binary_op!(BitAnd, bitand, intersection);
binary_op!(Mul, mul, intersection);
binary_op!(Sub, sub, SubSetR2::difference);
binary_op!(BitXor, bitxor, SubSetR2::xor);

impl Not for SubSetR2 {
    type Output = SubSetR2;
    fn not(self) -> SubSetR2 {
        self.invert()
    }
}

impl Not for &SubSetR2 {
    type Output = SubSetR2;
    fn not(self) -> SubSetR2 {
        self.invert()
    }
}

impl Neg for SubSetR2 {
    type Output = SubSetR2;
    fn neg(self) -> SubSetR2 {
        self.invert()
    }
}

impl Neg for &SubSetR2 {
    type Output = SubSetR2;
    fn neg(self) -> SubSetR2 {
        self.invert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn p(x: f64, y: f64) -> SubSetR2 {
        SubSetR2::point((x, y)).unwrap()
    }

    #[test]
    fn trivial_sets() {
        assert_eq!(EMPTY.to_string(), "EmptyR2");
        assert_eq!(WHOLE.to_string(), "WholeR2");
        assert!(EMPTY.invert().is_whole());
        assert!((!&WHOLE).is_empty());
        assert!((&EMPTY | &p(1., 2.)).same(&p(1., 2.)));
        assert!((&WHOLE | &p(1., 2.)).is_whole());
        assert!((&EMPTY & &p(1., 2.)).is_empty());
        assert!((&WHOLE * &p(1., 2.)).same(&p(1., 2.)));
    }

    #[test]
    fn points() {
        assert_eq!(p(1., 2.).to_string(), "{(1, 2)}");
        assert!(SubSetR2::point((f64::NAN, 0.)).is_err());
        let union = p(3., 0.) + p(1., 2.) + p(1., 2.);
        assert_eq!(union.to_string(), "OR[{(1, 2)}, {(3, 0)}]");
        assert!(union.same(&(p(1., 2.) | p(3., 0.))));
    }

    #[test]
    fn lazy_expressions() {
        let a = p(0., 0.);
        let b = p(1., 0.);
        assert_eq!((!&a).to_string(), "NOT[{(0, 0)}]");
        assert!((!!a.clone()).same(&a));
        assert!((-(-a.clone())).same(&a));
        assert_eq!((&a - &b).to_string(), "AND[{(0, 0)}, NOT[{(1, 0)}]]");
        assert_eq!(
            (&a ^ &b).to_string(),
            "OR[AND[{(0, 0)}, NOT[{(1, 0)}]], AND[{(1, 0)}, NOT[{(0, 0)}]]]"
        );
        assert!((&a & &a).same(&a));
        assert!(!(&a & &b).is_empty());
        assert!((&a & &b).is_lazy());
    }

    #[test]
    fn serde() {
        let json = serde_json::to_string(&p(1., 2.)).unwrap();
        assert_eq!(json, r#"{"kind":"Point","value":{"x":1.0,"y":2.0}}"#);
        let back: SubSetR2 = serde_json::from_str(&json).unwrap();
        assert!(back.same(&p(1., 2.)));
        assert_eq!(serde_json::to_string(&EMPTY).unwrap(), r#"{"kind":"Empty"}"#);
    }
}
