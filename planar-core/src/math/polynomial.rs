use std::ops::{Add, Mul, Neg, Sub};

use derive_more::Deref;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use roots::{find_roots_cubic, find_roots_linear, find_roots_quadratic, find_roots_quartic};

use super::tol::PARAM_EPS;

/// Real polynomial in power basis; `self[i]` is the coefficient of `t^i`.
#[derive(Clone, Debug, Deref, PartialEq)]
pub struct Polynomial(Vec<f64>);

impl Polynomial {
    pub fn new(mut coefs: Vec<f64>) -> Self {
        while coefs.len() > 1 && coefs.last() == Some(&0.) {
            coefs.pop();
        }
        if coefs.is_empty() {
            coefs.push(0.);
        }
        Polynomial(coefs)
    }

    pub fn constant(c: f64) -> Self {
        Polynomial(vec![c])
    }

    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn coef(&self, i: usize) -> f64 {
        self.0.get(i).copied().unwrap_or(0.)
    }

    pub fn eval(&self, t: f64) -> f64 {
        self.0.iter().rev().fold(0., |acc, c| acc * t + c)
    }

    pub fn derivative(&self) -> Polynomial {
        Polynomial::new(self.0.iter().enumerate().skip(1).map(|(i, c)| c * i as f64).collect())
    }

    pub fn max_abs_coef(&self) -> f64 {
        self.0.iter().fold(0., |m, c| m.max(c.abs()))
    }

    /// True if every coefficient is within `tol` of zero.
    pub fn is_zero(&self, tol: f64) -> bool {
        self.max_abs_coef() <= tol
    }

    /// Real roots in `[lo, hi]`, sorted and deduplicated.
    ///
    /// Coefficients negligible relative to the largest one are dropped before solving, so that
    /// a nearly-degenerate leading term doesn't produce spurious roots. Each root is then
    /// polished with a few Newton steps against the untrimmed polynomial.
    pub fn roots_in(&self, lo: f64, hi: f64) -> Vec<f64> {
        let scale = self.max_abs_coef();
        if scale == 0. {
            return vec![];
        }
        let trimmed = Polynomial::new(
            self.0.iter().map(|c| if c.abs() <= scale * 1e-13 { 0. } else { *c }).collect(),
        );
        let c = |i| trimmed.coef(i);
        let raw: Vec<f64> = match trimmed.degree() {
            0 => vec![],
            1 => find_roots_linear(c(1), c(0)).as_ref().to_vec(),
            2 => find_roots_quadratic(c(2), c(1), c(0)).as_ref().to_vec(),
            3 => find_roots_cubic(c(3), c(2), c(1), c(0)).as_ref().to_vec(),
            4 => find_roots_quartic(c(4), c(3), c(2), c(1), c(0)).as_ref().to_vec(),
            _ => trimmed.bracketed_roots(lo, hi),
        };
        let d = self.derivative();
        raw.into_iter()
            .filter(|r| r.is_finite())
            .map(|r| self.polish(&d, r))
            .filter(|r| *r >= lo - PARAM_EPS && *r <= hi + PARAM_EPS)
            .map(|r| r.clamp(lo, hi))
            .sorted_by_key(|r| OrderedFloat(*r))
            .dedup_by(|a, b| (a - b).abs() < PARAM_EPS)
            .collect()
    }

    fn polish(&self, d: &Polynomial, mut r: f64) -> f64 {
        for _ in 0..8 {
            let v = self.eval(r);
            let dv = d.eval(r);
            if v == 0. || dv == 0. {
                break;
            }
            let next = r - v / dv;
            if !next.is_finite() || self.eval(next).abs() >= v.abs() {
                break;
            }
            r = next;
        }
        r
    }

    /// Sign-change bisection, for degrees the closed-form solvers don't cover.
    fn bracketed_roots(&self, lo: f64, hi: f64) -> Vec<f64> {
        const STEPS: usize = 256;
        let ts: Vec<f64> = (0..=STEPS).map(|i| lo + (hi - lo) * i as f64 / STEPS as f64).collect();
        let mut roots = vec![];
        for (t0, t1) in ts.into_iter().tuple_windows() {
            let (mut a, mut b) = (t0, t1);
            let (mut fa, fb) = (self.eval(a), self.eval(b));
            if fa == 0. {
                roots.push(a);
                continue;
            }
            if fa.signum() == fb.signum() {
                continue;
            }
            for _ in 0..64 {
                let m = (a + b) / 2.;
                let fm = self.eval(m);
                if fm.signum() == fa.signum() {
                    a = m;
                    fa = fm;
                } else {
                    b = m;
                }
            }
            roots.push((a + b) / 2.);
        }
        roots
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: &Polynomial) -> Polynomial {
        let n = self.0.len().max(rhs.0.len());
        Polynomial::new((0..n).map(|i| self.coef(i) + rhs.coef(i)).collect())
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: &Polynomial) -> Polynomial {
        let n = self.0.len().max(rhs.0.len());
        Polynomial::new((0..n).map(|i| self.coef(i) - rhs.coef(i)).collect())
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut coefs = vec![0.; self.0.len() + rhs.0.len() - 1];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in rhs.0.iter().enumerate() {
                coefs[i + j] += a * b;
            }
        }
        Polynomial::new(coefs)
    }
}

impl Mul<f64> for &Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: f64) -> Polynomial {
        Polynomial::new(self.0.iter().map(|c| c * rhs).collect())
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        self * -1.
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        &self + &rhs
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        &self - &rhs
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

impl Mul<f64> for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: f64) -> Polynomial {
        &self * rhs
    }
}
