use std::fmt::{self, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    bool1d::SubSetR1,
    error::ShapeError,
    geometry::bbox::BBox,
    math::tol::{PARAM_EPS, POINT_EPS},
    r2::R2,
    segment::Segment,
};

/// Sequence of continuous [`Segment`]s, with a knot sequence mapping global parameters to
/// segment-local ones: global `t` in `[knots[i], knots[i+1]]` is segment `i` at
/// `(t - knots[i]) / (knots[i+1] - knots[i])`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PiecewiseFields")]
pub struct PiecewiseCurve {
    segments: Vec<Segment>,
    knots: Vec<f64>,
}

#[derive(Deserialize)]
struct PiecewiseFields {
    segments: Vec<Segment>,
    knots: Vec<f64>,
}

impl TryFrom<PiecewiseFields> for PiecewiseCurve {
    type Error = ShapeError;

    fn try_from(fields: PiecewiseFields) -> Result<Self, ShapeError> {
        PiecewiseCurve::with_knots(fields.segments, fields.knots)
    }
}

impl PiecewiseCurve {
    /// Knots default to `0, 1, ..., n`, so a global parameter reads as "segment index + local t".
    pub fn new(segments: Vec<Segment>) -> Result<Self, ShapeError> {
        let knots = (0..=segments.len()).map(|k| k as f64).collect();
        Self::with_knots(segments, knots)
    }

    pub fn with_knots(segments: Vec<Segment>, knots: Vec<f64>) -> Result<Self, ShapeError> {
        let expected = segments.len() + 1;
        if segments.is_empty()
            || knots.len() != expected
            || knots.iter().any(|k| !k.is_finite())
            || knots.iter().tuple_windows().any(|(a, b)| b <= a)
        {
            return Err(ShapeError::Knots { expected, knots });
        }
        for (idx, (prv, nxt)) in segments.iter().tuple_windows().enumerate() {
            let gap = prv.end().distance(&nxt.start());
            if gap > POINT_EPS {
                return Err(ShapeError::Discontinuous { idx: idx + 1, gap });
            }
        }
        Ok(PiecewiseCurve { segments, knots })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_knot(&self) -> f64 {
        self.knots[0]
    }

    pub fn last_knot(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    pub fn domain(&self) -> SubSetR1 {
        SubSetR1::closed(self.first_knot(), self.last_knot())
    }

    /// Global parameter for local parameter `t` on segment `idx`.
    pub fn global(&self, idx: usize, t: f64) -> f64 {
        self.knots[idx] + t * (self.knots[idx + 1] - self.knots[idx])
    }

    /// Segment index and local parameter for global parameter `t`.
    pub fn span(&self, t: f64) -> (usize, f64) {
        let n = self.segments.len();
        let idx = self.knots.partition_point(|k| *k <= t).clamp(1, n) - 1;
        let (k0, k1) = (self.knots[idx], self.knots[idx + 1]);
        (idx, ((t - k0) / (k1 - k0)).clamp(0., 1.))
    }

    pub fn start(&self) -> R2<f64> {
        self.segments[0].start()
    }

    pub fn end(&self) -> R2<f64> {
        self.segments[self.segments.len() - 1].end()
    }

    pub fn is_closed(&self) -> bool {
        self.start().distance(&self.end()) <= POINT_EPS
    }

    pub fn eval(&self, t: f64) -> R2<f64> {
        let (idx, local) = self.span(t);
        self.segments[idx].eval(local)
    }

    /// Direction of travel at `t`, for `t` strictly inside a segment.
    pub fn direction(&self, t: f64) -> R2<f64> {
        let (idx, local) = self.span(t);
        self.segments[idx].direction(local)
    }

    /// Direction of travel leaving `t`; at a knot, that of the segment starting there.
    pub fn direction_after(&self, t: f64) -> R2<f64> {
        let (idx, local) = self.span(t);
        let n = self.segments.len();
        if local >= 1. - PARAM_EPS {
            if idx + 1 < n {
                return self.segments[idx + 1].direction(0.);
            } else if self.is_closed() {
                return self.segments[0].direction(0.);
            }
        }
        self.segments[idx].direction(local)
    }

    /// Direction of travel arriving at `t`; at a knot, that of the segment ending there.
    pub fn direction_before(&self, t: f64) -> R2<f64> {
        let (idx, local) = self.span(t);
        let n = self.segments.len();
        if local <= PARAM_EPS {
            if idx > 0 {
                return self.segments[idx - 1].direction(1.);
            } else if self.is_closed() {
                return self.segments[n - 1].direction(1.);
            }
        }
        self.segments[idx].direction(local)
    }

    /// Segments tracing `[t0, t1]` (`t0 < t1`).
    pub fn section(&self, t0: f64, t1: f64) -> Vec<Segment> {
        self.segments
            .iter()
            .enumerate()
            .filter_map(|(idx, segment)| {
                let (k0, k1) = (self.knots[idx], self.knots[idx + 1]);
                let a = t0.max(k0);
                let b = t1.min(k1);
                if b - a <= PARAM_EPS {
                    return None;
                }
                let la = (a - k0) / (k1 - k0);
                let lb = (b - k0) / (k1 - k0);
                Some(segment.section(la, lb))
            })
            .collect()
    }

    pub fn reversed(&self) -> PiecewiseCurve {
        let (k0, kn) = (self.first_knot(), self.last_knot());
        PiecewiseCurve {
            segments: self.segments.iter().rev().map(|s| s.reversed()).collect(),
            knots: self.knots.iter().rev().map(|k| k0 + kn - k).collect(),
        }
    }

    pub fn bbox(&self) -> BBox {
        self.segments.iter().skip(1).fold(self.segments[0].bbox(), |b, s| b.union(&s.bbox()))
    }

    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }

    /// Polyline through `per_segment` samples of each segment, plus the final endpoint.
    pub fn points(&self, per_segment: usize) -> Vec<R2<f64>> {
        let per_segment = per_segment.max(1);
        let mut points: Vec<R2<f64>> = self
            .segments
            .iter()
            .flat_map(|s| (0..per_segment).map(move |i| s.eval(i as f64 / per_segment as f64)))
            .collect();
        points.push(self.end());
        points
    }

    /// Global parameter of the point closest to `p`, and its distance.
    pub fn closest(&self, p: &R2<f64>) -> (f64, f64) {
        self.segments
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let (t, d) = s.closest(p);
                (self.global(idx, t), d)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((self.first_knot(), f64::INFINITY))
    }
}

impl Display for PiecewiseCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Curve[{}]", self.segments.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn r2(x: f64, y: f64) -> R2<f64> {
        R2 { x, y }
    }

    fn zigzag() -> PiecewiseCurve {
        PiecewiseCurve::new(vec![
            Segment::line(r2(0., 0.), r2(1., 1.)),
            Segment::quadratic(r2(1., 1.), r2(2., 2.), r2(3., 0.)),
            Segment::line(r2(3., 0.), r2(4., 1.)),
        ])
        .unwrap()
    }

    #[test]
    fn knots_and_spans() {
        let c = zigzag();
        assert_eq!(c.knots(), &[0., 1., 2., 3.]);
        assert_eq!(c.span(1.5), (1, 0.5));
        assert_eq!(c.span(3.), (2, 1.));
        assert_eq!(c.span(-1.), (0, 0.));
        assert_relative_eq!(c.eval(2.5), r2(3.5, 0.5));
        assert_eq!(c.domain().to_string(), "[0, 3]");
        assert!(!c.is_closed());
    }

    #[test]
    fn custom_knots() {
        let segments = zigzag().segments().to_vec();
        let c = PiecewiseCurve::with_knots(segments.clone(), vec![0., 0.5, 2., 4.]).unwrap();
        assert_relative_eq!(c.eval(0.25), r2(0.5, 0.5));
        assert_relative_eq!(c.eval(3.), r2(3.5, 0.5));
        assert!(matches!(
            PiecewiseCurve::with_knots(segments.clone(), vec![0., 1., 1., 2.]),
            Err(ShapeError::Knots { expected: 4, .. })
        ));
        let broken = vec![segments[0].clone(), segments[2].clone()];
        assert!(matches!(PiecewiseCurve::new(broken), Err(ShapeError::Discontinuous { idx: 1, .. })));
    }

    #[test]
    fn directions_at_knots() {
        let c = zigzag();
        assert_relative_eq!(c.direction_before(1.), r2(1., 1.));
        assert_relative_eq!(c.direction_after(1.), r2(2., 2.));
        assert_relative_eq!(c.direction_before(2.), r2(2., -4.));
        assert_relative_eq!(c.direction_after(2.), r2(1., 1.));
    }

    #[test]
    fn sections_and_reversal() {
        let c = zigzag();
        let s = c.section(0.5, 2.5);
        assert_eq!(s.len(), 3);
        assert_relative_eq!(s[0].start(), r2(0.5, 0.5));
        assert_relative_eq!(s[2].end(), r2(3.5, 0.5));

        let r = c.reversed();
        assert_eq!(r.knots(), &[0., 1., 2., 3.]);
        assert_relative_eq!(r.eval(0.5), c.eval(2.5));
        assert_relative_eq!(r.start(), r2(4., 1.));

        let pts = c.points(2);
        assert_eq!(pts.len(), 7);
        assert_relative_eq!(pts[3], c.eval(1.5));
    }

    #[test]
    fn deserializing_checks_structure() {
        let json = serde_json::to_string(&zigzag()).unwrap();
        let back: PiecewiseCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zigzag());

        assert!(serde_json::from_str::<PiecewiseCurve>(r#"{"segments":[],"knots":[0.0]}"#).is_err());
        let mut value = serde_json::to_value(zigzag()).unwrap();
        value["knots"] = serde_json::json!([0., 2., 1., 3.]);
        assert!(serde_json::from_value::<PiecewiseCurve>(value).is_err());
        let gap = serde_json::json!({
            "segments": [Segment::line(r2(0., 0.), r2(1., 0.)), Segment::line(r2(2., 0.), r2(3., 0.))],
            "knots": [0., 1., 2.],
        });
        assert!(serde_json::from_value::<PiecewiseCurve>(gap).is_err());
        assert!(serde_json::from_str::<Segment>(r#"{"ctrl":[{"x":0.0,"y":0.0}]}"#).is_err());
    }
}
