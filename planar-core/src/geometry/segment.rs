use std::fmt::{self, Display};

use approx::AbsDiffEq;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::ShapeError,
    geometry::bbox::BBox,
    math::{
        polynomial::Polynomial,
        quadrature::{integrate, integrate_adaptive},
        tol::POINT_EPS,
    },
    r2::R2,
};

/// Directed Bezier curve piece of degree 1 (line), 2 (quadratic) or 3 (cubic), parametrized
/// over `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SegmentFields")]
pub struct Segment {
    ctrl: Vec<R2<f64>>,
}

#[derive(Deserialize)]
struct SegmentFields {
    ctrl: Vec<R2<f64>>,
}

impl TryFrom<SegmentFields> for Segment {
    type Error = ShapeError;

    fn try_from(fields: SegmentFields) -> Result<Self, ShapeError> {
        Segment::new(fields.ctrl)
    }
}

fn de_casteljau(pts: &[R2<f64>], t: f64) -> R2<f64> {
    let mut pts = pts.to_vec();
    for k in (1..pts.len()).rev() {
        for i in 0..k {
            pts[i] = pts[i].lerp(&pts[i + 1], t);
        }
    }
    pts[0]
}

fn hodograph(pts: &[R2<f64>]) -> Vec<R2<f64>> {
    let n = (pts.len() - 1) as f64;
    pts.iter().tuple_windows().map(|(a, b)| (*b - *a) * n).collect()
}

impl Segment {
    /// Validated constructor: 2 to 4 finite control points.
    pub fn new(ctrl: Vec<R2<f64>>) -> Result<Self, ShapeError> {
        if !(2..=4).contains(&ctrl.len()) {
            return Err(ShapeError::ControlPoints(ctrl.len()));
        }
        if let Some(p) = ctrl.iter().find(|p| !p.is_finite()) {
            return Err(ShapeError::NonFinitePoint(p.to_string()));
        }
        Ok(Segment { ctrl })
    }

    pub fn line(p0: R2<f64>, p1: R2<f64>) -> Self {
        Segment { ctrl: vec![p0, p1] }
    }

    pub fn quadratic(p0: R2<f64>, p1: R2<f64>, p2: R2<f64>) -> Self {
        Segment { ctrl: vec![p0, p1, p2] }
    }

    pub fn cubic(p0: R2<f64>, p1: R2<f64>, p2: R2<f64>, p3: R2<f64>) -> Self {
        Segment { ctrl: vec![p0, p1, p2, p3] }
    }

    pub fn ctrl(&self) -> &[R2<f64>] {
        &self.ctrl
    }

    pub(crate) fn ctrl_mut(&mut self) -> &mut [R2<f64>] {
        &mut self.ctrl
    }

    pub fn degree(&self) -> usize {
        self.ctrl.len() - 1
    }

    pub fn is_line(&self) -> bool {
        self.degree() == 1
    }

    pub fn start(&self) -> R2<f64> {
        self.ctrl[0]
    }

    pub fn end(&self) -> R2<f64> {
        self.ctrl[self.ctrl.len() - 1]
    }

    pub fn eval(&self, t: f64) -> R2<f64> {
        de_casteljau(&self.ctrl, t)
    }

    pub fn derivative(&self, t: f64) -> R2<f64> {
        de_casteljau(&hodograph(&self.ctrl), t)
    }

    pub fn second_derivative(&self, t: f64) -> R2<f64> {
        if self.degree() < 2 {
            R2 { x: 0., y: 0. }
        } else {
            de_casteljau(&hodograph(&hodograph(&self.ctrl)), t)
        }
    }

    /// Direction of travel at `t`. Where the derivative vanishes (repeated control points), a
    /// short chord in the direction of travel stands in for it.
    pub fn direction(&self, t: f64) -> R2<f64> {
        let d = self.derivative(t);
        if d.norm() > POINT_EPS {
            return d;
        }
        const H: f64 = 1e-6;
        if t < 0.5 {
            self.eval(t + H) - self.eval(t)
        } else {
            self.eval(t) - self.eval(t - H)
        }
    }

    /// Splits at `t` into `[0, t]` and `[t, 1]`, each reparametrized over `[0, 1]`.
    pub fn split(&self, t: f64) -> (Segment, Segment) {
        let mut pts = self.ctrl.clone();
        let n = pts.len();
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        left.push(pts[0]);
        right.push(pts[n - 1]);
        for k in (1..n).rev() {
            for i in 0..k {
                pts[i] = pts[i].lerp(&pts[i + 1], t);
            }
            left.push(pts[0]);
            right.push(pts[k - 1]);
        }
        right.reverse();
        (Segment { ctrl: left }, Segment { ctrl: right })
    }

    /// The piece over `[t0, t1]`, reversed if `t0 > t1`.
    pub fn section(&self, t0: f64, t1: f64) -> Segment {
        if t0 > t1 {
            return self.section(t1, t0).reversed();
        }
        let right = if t0 <= 0. { self.clone() } else { self.split(t0).1 };
        if 1. - t0 < 1e-15 {
            return Segment { ctrl: vec![right.end(); right.ctrl.len()] };
        }
        let u = (t1 - t0) / (1. - t0);
        if u >= 1. { right } else { right.split(u).0 }
    }

    pub fn reversed(&self) -> Segment {
        Segment { ctrl: self.ctrl.iter().rev().copied().collect() }
    }

    /// Control-point box; contains the whole curve.
    pub fn bbox(&self) -> BBox {
        BBox::of(&self.ctrl)
    }

    /// Power-basis coordinate functions `(x(t), y(t))`.
    pub fn polynomials(&self) -> (Polynomial, Polynomial) {
        let p = &self.ctrl;
        let coefs: Vec<R2<f64>> = match self.degree() {
            1 => vec![p[0], p[1] - p[0]],
            2 => vec![p[0], (p[1] - p[0]) * 2., p[0] - p[1] * 2. + p[2]],
            _ => vec![
                p[0],
                (p[1] - p[0]) * 3.,
                (p[0] - p[1] * 2. + p[2]) * 3.,
                p[3] - p[0] + (p[1] - p[2]) * 3.,
            ],
        };
        (
            Polynomial::new(coefs.iter().map(|c| c.x).collect()),
            Polynomial::new(coefs.iter().map(|c| c.y).collect()),
        )
    }

    /// This segment's contribution to the signed area of a closed curve: `½∫(x dy - y dx)`.
    pub fn area_term(&self) -> f64 {
        if self.is_line() {
            return self.start().cross(&self.end()) / 2.;
        }
        integrate(|t| self.eval(t).cross(&self.derivative(t)), 0., 1.) / 2.
    }

    pub fn length(&self) -> f64 {
        if self.is_line() {
            return self.start().distance(&self.end());
        }
        integrate_adaptive(&|t| self.derivative(t).norm(), 0., 1., 1e-12)
    }

    /// Parameter of the point on this segment closest to `p`, and its distance.
    pub fn closest(&self, p: &R2<f64>) -> (f64, f64) {
        if self.is_line() {
            let d = self.end() - self.start();
            let len2 = d.norm2();
            let t = if len2 == 0. { 0. } else { ((*p - self.start()).dot(&d) / len2).clamp(0., 1.) };
            return (t, self.eval(t).distance(p));
        }
        const SAMPLES: usize = 32;
        let mut best = (0..=SAMPLES)
            .map(|i| i as f64 / SAMPLES as f64)
            .map(|t| (t, self.eval(t).distance(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0., f64::INFINITY));
        let mut t = best.0;
        for _ in 0..16 {
            let r = self.eval(t) - *p;
            let d1 = self.derivative(t);
            let f = r.dot(&d1);
            let df = d1.norm2() + r.dot(&self.second_derivative(t));
            if df.abs() < 1e-300 {
                break;
            }
            t = (t - f / df).clamp(0., 1.);
            let dist = self.eval(t).distance(p);
            if dist < best.1 {
                best = (t, dist);
            }
        }
        best
    }

    pub fn approx_eq(&self, o: &Segment, tol: f64) -> bool {
        self.ctrl.len() == o.ctrl.len() && self.ctrl.iter().zip(o.ctrl.iter()).all(|(a, b)| a.abs_diff_eq(b, tol))
    }

    /// All control points coincide.
    pub fn is_degenerate(&self) -> bool {
        self.ctrl.iter().all(|p| p.abs_diff_eq(&self.ctrl[0], POINT_EPS))
    }

    /// Control points all lie on one line through the endpoints.
    pub fn is_flat(&self, tol: f64) -> bool {
        let d = self.end() - self.start();
        let len = d.norm();
        if len == 0. {
            return self.is_degenerate();
        }
        self.ctrl.iter().all(|p| (d.cross(&(*p - self.start())) / len).abs() <= tol)
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.degree() {
            1 => "Line",
            2 => "Quadratic",
            _ => "Cubic",
        };
        write!(f, "{}[{}]", kind, self.ctrl.iter().join(", "))
    }
}
