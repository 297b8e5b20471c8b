use std::fmt::{self, Display};

use anyhow::{bail, Result};
use derive_more::From;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    bool2d::subset::SubSetR2,
    error::ShapeError,
    jordan::JordanCurve,
    math::tol::BOUNDARY_EPS,
};

/// Region bounded by one Jordan curve: its interior if the curve runs counter-clockwise, its
/// exterior if clockwise. `boundary` says whether the curve itself belongs to the set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleShape {
    pub jordan: JordanCurve,
    pub boundary: bool,
}

impl SimpleShape {
    pub fn new(jordan: JordanCurve) -> Self {
        SimpleShape { jordan, boundary: true }
    }

    /// Same region, without its boundary.
    pub fn open(jordan: JordanCurve) -> Self {
        SimpleShape { jordan, boundary: false }
    }

    /// Signed: negative for clockwise curves.
    pub fn area(&self) -> f64 {
        self.jordan.area()
    }

    pub fn sign(&self) -> i8 {
        self.jordan.orientation()
    }

    pub fn is_bounded(&self) -> bool {
        self.sign() > 0
    }

    /// Complement: reversed curve, with boundary membership flipped.
    pub fn invert(&self) -> SimpleShape {
        SimpleShape { jordan: self.jordan.reversed(), boundary: !self.boundary }
    }

    fn order_key(&self) -> (i8, OrderedFloat<f64>, (OrderedFloat<f64>, OrderedFloat<f64>)) {
        let start = self.jordan.canonical().segments()[0].start();
        (-self.sign(), OrderedFloat(-self.area().abs()), start.key())
    }
}

impl Display for SimpleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.boundary { "SimpleShape" } else { "OpenShape" };
        write!(f, "{}[{}]", kind, self.jordan.canonical())
    }
}

/// Intersection of simple shapes: at most one bounded outer curve, plus holes. Without an outer
/// curve, the region is the plane minus its holes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ConnectedFields")]
pub struct ConnectedShape {
    subshapes: Vec<SimpleShape>,
}

#[derive(Deserialize)]
struct ConnectedFields {
    subshapes: Vec<SimpleShape>,
}

impl TryFrom<ConnectedFields> for ConnectedShape {
    type Error = ShapeError;

    fn try_from(fields: ConnectedFields) -> Result<Self, ShapeError> {
        ConnectedShape::new(fields.subshapes)
    }
}

/// `inner`'s curve lies inside the region `outer`'s curve winds around.
pub fn encloses(outer: &JordanCurve, inner: &JordanCurve) -> bool {
    for segment in inner.segments() {
        for t in [0.5, 0.25, 0.75] {
            let p = segment.eval(t);
            if outer.locate(&p).is_none() {
                return outer.winding(&p).round() != 0.;
            }
        }
    }
    // Every sample is on `outer`: the curves coincide
    inner.area().abs() <= outer.area().abs() + BOUNDARY_EPS
}

impl ConnectedShape {
    pub fn new(subshapes: Vec<SimpleShape>) -> Result<Self, ShapeError> {
        if subshapes.len() < 2 {
            return Err(ShapeError::InvalidComponent(format!(
                "connected shape needs at least 2 curves, got {}",
                subshapes.len()
            )));
        }
        let (outers, holes): (Vec<_>, Vec<_>) = subshapes.iter().partition(|s| s.is_bounded());
        if outers.len() > 1 {
            return Err(ShapeError::InvalidComponent(format!("{} outer curves in one connected shape", outers.len())));
        }
        if let Some(outer) = outers.first() {
            if let Some(hole) = holes.iter().find(|h| !encloses(&outer.jordan, &h.jordan)) {
                return Err(ShapeError::InvalidComponent(format!("hole {} outside {}", hole, outer)));
            }
        }
        for (a, b) in holes.iter().tuple_combinations() {
            if encloses(&a.jordan, &b.jordan) || encloses(&b.jordan, &a.jordan) {
                return Err(ShapeError::InvalidComponent(format!("nested holes {} and {}", a, b)));
            }
        }
        Ok(Self::from_parts(subshapes))
    }

    pub(crate) fn from_parts(subshapes: Vec<SimpleShape>) -> Self {
        let subshapes = subshapes.into_iter().sorted_by_cached_key(|s| s.order_key()).collect();
        ConnectedShape { subshapes }
    }

    pub fn subshapes(&self) -> &[SimpleShape] {
        &self.subshapes
    }

    pub fn outer(&self) -> Option<&SimpleShape> {
        self.subshapes.iter().find(|s| s.is_bounded())
    }

    pub fn holes(&self) -> impl Iterator<Item = &SimpleShape> {
        self.subshapes.iter().filter(|s| !s.is_bounded())
    }

    pub fn area(&self) -> f64 {
        self.subshapes.iter().map(|s| s.area()).sum()
    }
}

fn same_members<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x == y))
}

impl PartialEq for ConnectedShape {
    fn eq(&self, other: &Self) -> bool {
        same_members(&self.subshapes, &other.subshapes)
    }
}

impl Display for ConnectedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectedShape[{}]", self.subshapes.iter().join(", "))
    }
}

/// Pairwise disjoint, non-nested components.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "DisjointFields")]
pub struct DisjointShape {
    components: Vec<Shape>,
}

#[derive(Deserialize)]
struct DisjointFields {
    components: Vec<Shape>,
}

impl TryFrom<DisjointFields> for DisjointShape {
    type Error = ShapeError;

    fn try_from(fields: DisjointFields) -> Result<Self, ShapeError> {
        DisjointShape::new(fields.components)
    }
}

impl DisjointShape {
    pub fn new(components: Vec<Shape>) -> Result<Self, ShapeError> {
        if components.len() < 2 {
            return Err(ShapeError::InvalidComponent(format!(
                "disjoint shape needs at least 2 components, got {}",
                components.len()
            )));
        }
        if let Some(nested) = components.iter().find(|c| matches!(c, Shape::Disjoint(_))) {
            return Err(ShapeError::InvalidComponent(format!("nested {}", nested)));
        }
        Ok(Self::from_parts(components))
    }

    pub(crate) fn from_parts(components: Vec<Shape>) -> Self {
        let components = components.into_iter().sorted_by_cached_key(|c| c.order_key()).collect();
        DisjointShape { components }
    }

    pub fn components(&self) -> &[Shape] {
        &self.components
    }

    pub fn area(&self) -> f64 {
        self.components.iter().map(|c| c.area()).sum()
    }
}

impl PartialEq for DisjointShape {
    fn eq(&self, other: &Self) -> bool {
        same_members(&self.components, &other.components)
    }
}

impl Display for DisjointShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DisjointShape[{}]", self.components.iter().join(", "))
    }
}

#[derive(Clone, Debug, From, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Shape {
    Simple(SimpleShape),
    Connected(ConnectedShape),
    Disjoint(DisjointShape),
}

impl Shape {
    pub fn simples(&self) -> Vec<&SimpleShape> {
        match self {
            Shape::Simple(s) => vec![s],
            Shape::Connected(c) => c.subshapes.iter().collect(),
            Shape::Disjoint(d) => d.components.iter().flat_map(|c| c.simples()).collect(),
        }
    }

    pub fn jordans(&self) -> Vec<&JordanCurve> {
        self.simples().into_iter().map(|s| &s.jordan).collect()
    }

    pub fn area(&self) -> f64 {
        match self {
            Shape::Simple(s) => s.area(),
            Shape::Connected(c) => c.area(),
            Shape::Disjoint(d) => d.area(),
        }
    }

    /// Complement, regrouped into canonical components.
    pub fn invert(&self) -> SubSetR2 {
        match self {
            Shape::Simple(s) => SubSetR2::Shape(Shape::Simple(s.invert())),
            _ => shape_from_simples(self.simples().into_iter().map(|s| s.invert()).collect()),
        }
    }

    fn order_key(&self) -> (i8, OrderedFloat<f64>, (OrderedFloat<f64>, OrderedFloat<f64>)) {
        match self {
            Shape::Simple(s) => s.order_key(),
            Shape::Connected(c) => c.subshapes[0].order_key(),
            Shape::Disjoint(d) => d.components[0].order_key(),
        }
    }

    /// Checks area-sign invariants: outer curves positive, holes negative and smaller than
    /// their outer curve.
    pub fn verify(&self) -> Result<()> {
        match self {
            Shape::Simple(s) => {
                if s.area().abs() <= BOUNDARY_EPS {
                    bail!("{} encloses no area", s);
                }
            }
            Shape::Connected(c) => {
                let outers = c.subshapes.iter().filter(|s| s.is_bounded()).count();
                if outers > 1 {
                    bail!("{}: {} outer curves", c, outers);
                }
                if let Some(outer) = c.outer() {
                    let holes: f64 = c.holes().map(|h| h.area()).sum();
                    if outer.area() + holes <= 0. {
                        bail!("{}: holes ({}) exceed outer area ({})", c, -holes, outer.area());
                    }
                }
            }
            Shape::Disjoint(d) => {
                for component in &d.components {
                    if let Shape::Disjoint(_) = component {
                        bail!("{}: nested disjoint shape", d);
                    }
                    component.verify()?;
                }
            }
        }
        Ok(())
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Simple(s) => write!(f, "{}", s),
            Shape::Connected(c) => write!(f, "{}", c),
            Shape::Disjoint(d) => write!(f, "{}", d),
        }
    }
}

/// Groups non-crossing simple shapes into components: each hole joins the smallest bounded
/// shape enclosing it; holes enclosed by none form one unbounded component.
pub fn shape_from_simples(simples: Vec<SimpleShape>) -> SubSetR2 {
    let (outers, holes): (Vec<SimpleShape>, Vec<SimpleShape>) = simples.into_iter().partition(|s| s.is_bounded());
    let outers: Vec<SimpleShape> = outers.into_iter().sorted_by_key(|s| OrderedFloat(s.area())).collect();
    let mut owned: Vec<Vec<SimpleShape>> = vec![vec![]; outers.len()];
    let mut unbounded: Vec<SimpleShape> = vec![];
    for hole in holes {
        match outers.iter().position(|o| encloses(&o.jordan, &hole.jordan)) {
            Some(idx) => owned[idx].push(hole),
            None => unbounded.push(hole),
        }
    }
    let mut components: Vec<Shape> = outers
        .into_iter()
        .zip(owned)
        .map(|(outer, holes)| {
            if holes.is_empty() {
                Shape::Simple(outer)
            } else {
                Shape::Connected(ConnectedShape::from_parts([vec![outer], holes].concat()))
            }
        })
        .collect();
    match unbounded.len() {
        0 => {}
        1 => components.extend(unbounded.into_iter().map(Shape::Simple)),
        _ => components.push(Shape::Connected(ConnectedShape::from_parts(unbounded))),
    }
    match components.len() {
        0 => SubSetR2::Empty,
        1 => components.into_iter().next().map_or(SubSetR2::Empty, SubSetR2::Shape),
        _ => SubSetR2::Shape(Shape::Disjoint(DisjointShape::from_parts(components))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r2::R2;
    use test_log::test;

    fn square(x0: f64, y0: f64, side: f64) -> JordanCurve {
        let v = |x: f64, y: f64| R2 { x: x0 + x * side, y: y0 + y * side };
        JordanCurve::polygon(&[v(0., 0.), v(1., 0.), v(1., 1.), v(0., 1.)]).unwrap()
    }

    #[test]
    fn connected_with_hole() {
        let outer = SimpleShape::new(square(0., 0., 4.));
        let hole = SimpleShape::new(square(1., 1., 2.).reversed());
        let shape = ConnectedShape::new(vec![hole.clone(), outer.clone()]).unwrap();
        assert_relative_eq!(shape.area(), 12.);
        assert_eq!(shape.outer(), Some(&outer));
        assert_eq!(shape.holes().count(), 1);
        assert!(Shape::Connected(shape).verify().is_ok());

        let stray = SimpleShape::new(square(5., 5., 1.).reversed());
        assert!(ConnectedShape::new(vec![outer.clone(), stray]).is_err());
        assert!(ConnectedShape::new(vec![outer.clone(), outer]).is_err());
    }

    #[test]
    fn grouping() {
        let grouped = shape_from_simples(vec![
            SimpleShape::new(square(1., 1., 2.).reversed()),
            SimpleShape::new(square(10., 0., 1.)),
            SimpleShape::new(square(0., 0., 4.)),
        ]);
        let SubSetR2::Shape(Shape::Disjoint(d)) = grouped else { panic!("expected disjoint shape, got {}", grouped) };
        assert_eq!(d.components().len(), 2);
        assert_relative_eq!(d.area(), 13.);
        assert!(matches!(d.components()[0], Shape::Connected(_)));
    }

    #[test]
    fn inverting_a_connected_shape() {
        let shape = Shape::Connected(ConnectedShape::from_parts(vec![
            SimpleShape::new(square(0., 0., 4.)),
            SimpleShape::new(square(1., 1., 2.).reversed()),
        ]));
        let SubSetR2::Shape(Shape::Disjoint(inverse)) = shape.invert() else { panic!("expected disjoint shape") };
        assert_eq!(inverse.components().len(), 2);
        assert_relative_eq!(inverse.area(), -12.);
        let SubSetR2::Shape(back) = Shape::Disjoint(inverse).invert() else { panic!("expected a shape") };
        assert_eq!(back, shape);
    }

    #[test]
    fn verify_flags_empty_curves() {
        let flat = JordanCurve::from_segments_unchecked(vec![
            crate::segment::Segment::line(R2 { x: 0., y: 0. }, R2 { x: 1., y: 0. }),
            crate::segment::Segment::line(R2 { x: 1., y: 0. }, R2 { x: 0., y: 0. }),
        ])
        .unwrap();
        assert!(Shape::Simple(SimpleShape::new(flat)).verify().is_err());
    }

    #[test]
    fn deserializing_checks_components() {
        let outer = SimpleShape::new(square(0., 0., 4.));
        let hole = SimpleShape::new(square(1., 1., 2.).reversed());
        let shape = ConnectedShape::new(vec![outer.clone(), hole.clone()]).unwrap();
        let back: ConnectedShape = serde_json::from_str(&serde_json::to_string(&shape).unwrap()).unwrap();
        assert_eq!(back, shape);

        let lonely = serde_json::json!({ "subshapes": [outer] });
        assert!(serde_json::from_value::<ConnectedShape>(lonely).is_err());
        let stray = SimpleShape::new(square(5., 5., 1.).reversed());
        let escaped = serde_json::json!({ "subshapes": [outer, stray] });
        assert!(serde_json::from_value::<ConnectedShape>(escaped).is_err());
        let single = serde_json::json!({ "components": [Shape::Simple(outer)] });
        assert!(serde_json::from_value::<DisjointShape>(single).is_err());

        let bowtie = r#"{"kind":"Simple","jordan":{"curve":{"segments":[
            {"ctrl":[{"x":0.0,"y":0.0},{"x":1.0,"y":1.0}]},
            {"ctrl":[{"x":1.0,"y":1.0},{"x":1.0,"y":0.0}]},
            {"ctrl":[{"x":1.0,"y":0.0},{"x":0.0,"y":1.0}]},
            {"ctrl":[{"x":0.0,"y":1.0},{"x":0.0,"y":0.0}]}
        ],"knots":[0.0,1.0,2.0,3.0,4.0]}},"boundary":true}"#;
        assert!(serde_json::from_str::<Shape>(bowtie).is_err());
    }
}
