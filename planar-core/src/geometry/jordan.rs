use std::fmt::{self, Display};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::intersect::self_intersections,
    error::{Error, GeometryError, ShapeError},
    geometry::bbox::BBox,
    math::{
        angle::Angle,
        tol::{BOUNDARY_EPS, POINT_EPS},
    },
    piecewise::PiecewiseCurve,
    r2::R2,
    segment::Segment,
};

/// Closed, simple [`PiecewiseCurve`]. Counter-clockwise curves (positive area) enclose their
/// interior; clockwise ones enclose their exterior.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "JordanFields")]
pub struct JordanCurve {
    curve: PiecewiseCurve,
}

#[derive(Deserialize)]
struct JordanFields {
    curve: PiecewiseCurve,
}

impl TryFrom<JordanFields> for JordanCurve {
    type Error = Error;

    fn try_from(fields: JordanFields) -> Result<Self, Error> {
        JordanCurve::from_curve(fields.curve)
    }
}

impl JordanCurve {
    pub fn new(segments: Vec<Segment>) -> Result<Self, Error> {
        Self::from_curve(PiecewiseCurve::new(segments)?)
    }

    /// Checks that `curve` is closed and doesn't cross itself.
    pub fn from_curve(curve: PiecewiseCurve) -> Result<Self, Error> {
        let gap = curve.start().distance(&curve.end());
        if gap > POINT_EPS {
            return Err(ShapeError::NotClosed { gap }.into());
        }
        if let Some((seg0, seg1, p)) = self_intersections(&curve)?.into_iter().next() {
            return Err(GeometryError::NotSimple { seg0, seg1, p }.into());
        }
        Ok(JordanCurve { curve })
    }

    /// Closed polyline through `vertices`.
    pub fn polygon(vertices: &[R2<f64>]) -> Result<Self, Error> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()).into());
        }
        if let Some(v) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(ShapeError::NonFinitePoint(v.to_string()).into());
        }
        let segments = vertices.iter().circular_tuple_windows().map(|(a, b)| Segment::line(*a, *b)).collect();
        Self::new(segments)
    }

    /// For curves that are closed and simple by construction.
    pub(crate) fn from_segments_unchecked(segments: Vec<Segment>) -> Result<Self, ShapeError> {
        Ok(JordanCurve { curve: PiecewiseCurve::new(segments)? })
    }

    pub fn curve(&self) -> &PiecewiseCurve {
        &self.curve
    }

    pub(crate) fn curve_mut(&mut self) -> &mut PiecewiseCurve {
        &mut self.curve
    }

    pub fn segments(&self) -> &[Segment] {
        self.curve.segments()
    }

    /// Segment start points.
    pub fn vertices(&self) -> Vec<R2<f64>> {
        self.segments().iter().map(|s| s.start()).collect()
    }

    pub fn area(&self) -> f64 {
        self.segments().iter().map(|s| s.area_term()).sum()
    }

    /// +1 for counter-clockwise, -1 for clockwise.
    pub fn orientation(&self) -> i8 {
        if self.area() >= 0. { 1 } else { -1 }
    }

    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    pub fn bbox(&self) -> BBox {
        self.curve.bbox()
    }

    pub fn points(&self, per_segment: usize) -> Vec<R2<f64>> {
        self.curve.points(per_segment)
    }

    pub fn reversed(&self) -> JordanCurve {
        JordanCurve { curve: self.curve.reversed() }
    }

    /// Number of counter-clockwise turns the curve makes around `p`. Integral unless `p` is on
    /// the curve.
    ///
    /// Each segment contributes the angle between its endpoints as seen from `p`, which is exact
    /// once `p` lies outside the segment's control box (the segment then spans less than half a
    /// turn); segments are bisected until that holds.
    pub fn winding(&self, p: &R2<f64>) -> f64 {
        fn sweep(segment: &Segment, p: &R2<f64>, depth: usize) -> f64 {
            if segment.is_line() || depth >= 48 || !segment.bbox().contains(p, 0.) {
                Angle::of(segment.end() - *p).delta(Angle::of(segment.start() - *p))
            } else {
                let (l, r) = segment.split(0.5);
                sweep(&l, p, depth + 1) + sweep(&r, p, depth + 1)
            }
        }
        self.segments().iter().map(|s| sweep(s, p, 0)).sum()
    }

    /// Where `p` lies on the curve, if it does: segment index and local parameter.
    pub fn locate(&self, p: &R2<f64>) -> Option<(usize, f64)> {
        self.segments()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.bbox().contains(p, BOUNDARY_EPS))
            .map(|(idx, s)| {
                let (t, d) = s.closest(p);
                (idx, t, d)
            })
            .filter(|(_, _, d)| *d <= BOUNDARY_EPS)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(idx, t, _)| (idx, t))
    }

    /// Same curve with consecutive collinear lines merged, starting from its lowest
    /// (lexicographically smallest) vertex.
    pub fn canonical(&self) -> JordanCurve {
        let mut segments: Vec<Segment> = vec![];
        for s in self.segments() {
            match segments.last_mut() {
                Some(prev) if continues(prev, s) => *prev = Segment::line(prev.start(), s.end()),
                _ => segments.push(s.clone()),
            }
        }
        while segments.len() > 2 && continues(&segments[segments.len() - 1], &segments[0]) {
            if let Some(last) = segments.pop() {
                segments[0] = Segment::line(last.start(), segments[0].end());
            }
        }
        let start = segments.iter().position_min_by_key(|s| s.start().key()).unwrap_or(0);
        segments.rotate_left(start);
        if segments.len() != self.segments().len() {
            debug!("canonical: merged {} segments into {}", self.segments().len(), segments.len());
        }
        match PiecewiseCurve::new(segments) {
            Ok(curve) => JordanCurve { curve },
            Err(_) => self.clone(),
        }
    }
}

/// `b` is a line continuing line `a` in the same direction.
fn continues(a: &Segment, b: &Segment) -> bool {
    if !a.is_line() || !b.is_line() {
        return false;
    }
    let da = a.end() - a.start();
    let db = b.end() - b.start();
    da.cross(&db).abs() <= 1e-9 * da.norm() * db.norm() && da.dot(&db) > 0.
}

impl PartialEq for JordanCurve {
    /// Same oriented boundary, whatever the starting point or the splitting of straight edges.
    fn eq(&self, other: &Self) -> bool {
        let a = self.canonical();
        let b = other.canonical();
        let (sa, sb) = (a.segments(), b.segments());
        if sa.len() != sb.len() {
            return false;
        }
        let n = sa.len();
        (0..n).any(|k| (0..n).all(|i| sa[i].approx_eq(&sb[(i + k) % n], POINT_EPS)))
    }
}

impl Display for JordanCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments().iter().all(|s| s.is_line()) {
            write!(f, "Polygon[{}]", self.vertices().iter().join(", "))
        } else {
            write!(f, "Jordan[{}]", self.segments().iter().join(", "))
        }
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
        JordanCurve::polygon(&[r2(0., 0.), r2(1., 0.), r2(1., 1.), r2(0., 1.)]).unwrap()
    }

    #[test]
    fn area_and_orientation() {
        let s = square();
        assert_relative_eq!(s.area(), 1.);
        assert_eq!(s.orientation(), 1);
        assert_relative_eq!(s.reversed().area(), -1.);
        assert_eq!(s.reversed().orientation(), -1);
        assert_relative_eq!(s.length(), 4.);
        assert_eq!(s.to_string(), "Polygon[(0, 0), (1, 0), (1, 1), (0, 1)]");
    }

    #[test]
    fn winding_numbers() {
        let s = square();
        assert_relative_eq!(s.winding(&r2(0.5, 0.5)), 1., epsilon = 1e-12);
        assert_relative_eq!(s.winding(&r2(2., 0.5)), 0., epsilon = 1e-12);
        assert_relative_eq!(s.reversed().winding(&r2(0.5, 0.5)), -1., epsilon = 1e-12);

        // Lens bounded by two arches
        let lens = JordanCurve::new(vec![
            Segment::quadratic(r2(0., 0.), r2(1., -1.), r2(2., 0.)),
            Segment::quadratic(r2(2., 0.), r2(1., 1.), r2(0., 0.)),
        ])
        .unwrap();
        assert_relative_eq!(lens.winding(&r2(1., 0.4)), 1., epsilon = 1e-12);
        assert_relative_eq!(lens.winding(&r2(1., 0.6)), 0., epsilon = 1e-12);
        assert_relative_eq!(lens.area(), 4. / 3., epsilon = 1e-12);
    }

    #[test]
    fn locate_on_boundary() {
        let s = square();
        let (idx, t) = s.locate(&r2(1., 0.25)).unwrap();
        assert_eq!(idx, 1);
        assert_relative_eq!(t, 0.25);
        assert_eq!(s.locate(&r2(0.5, 0.5)), None);
    }

    #[test]
    fn equality_is_cyclic_and_merges_collinear_edges() {
        let shifted = JordanCurve::polygon(&[r2(1., 1.), r2(0., 1.), r2(0., 0.), r2(1., 0.)]).unwrap();
        assert_eq!(square(), shifted);
        let split = JordanCurve::polygon(&[r2(0., 0.), r2(0.5, 0.), r2(1., 0.), r2(1., 1.), r2(0., 1.), r2(0., 0.5)]).unwrap();
        assert_eq!(square(), split);
        assert_ne!(square(), square().reversed());
        assert_eq!(split.canonical().segments().len(), 4);
    }

    #[test]
    fn invalid_curves() {
        assert!(matches!(
            JordanCurve::polygon(&[r2(0., 0.), r2(1., 1.), r2(1., 0.), r2(0., 1.)]),
            Err(Error::Geometry(GeometryError::NotSimple { .. }))
        ));
        assert!(matches!(
            JordanCurve::new(vec![Segment::line(r2(0., 0.), r2(1., 0.)), Segment::line(r2(1., 0.), r2(1., 1.))]),
            Err(Error::Shape(ShapeError::NotClosed { .. }))
        ));
        assert!(matches!(
            JordanCurve::polygon(&[r2(0., 0.), r2(1., 1.)]),
            Err(Error::Shape(ShapeError::TooFewVertices(2)))
        ));
    }

    #[test]
    fn deserializing_checks_simplicity() {
        let json = serde_json::to_string(&square()).unwrap();
        let back: JordanCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square());

        let bowtie = PiecewiseCurve::new(vec![
            Segment::line(r2(0., 0.), r2(1., 1.)),
            Segment::line(r2(1., 1.), r2(1., 0.)),
            Segment::line(r2(1., 0.), r2(0., 1.)),
            Segment::line(r2(0., 1.), r2(0., 0.)),
        ])
        .unwrap();
        let json = format!(r#"{{"curve":{}}}"#, serde_json::to_string(&bowtie).unwrap());
        let err = serde_json::from_str::<JordanCurve>(&json).unwrap_err();
        assert!(err.to_string().contains("not simple"), "{}", err);

        let open = PiecewiseCurve::new(vec![Segment::line(r2(0., 0.), r2(1., 0.)), Segment::line(r2(1., 0.), r2(1., 1.))]).unwrap();
        let json = format!(r#"{{"curve":{}}}"#, serde_json::to_string(&open).unwrap());
        assert!(serde_json::from_str::<JordanCurve>(&json).is_err());
    }
}
