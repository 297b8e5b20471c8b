use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

use crate::math::angle::Angle;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct R2<D> {
    pub x: D,
    pub y: D,
}

impl<D: Display> Display for R2<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl<D> From<(D, D)> for R2<D> {
    fn from((x, y): (D, D)) -> Self {
        R2 { x, y }
    }
}

impl<D: num_traits::Zero> R2<D> {
    pub fn zero() -> Self {
        R2 { x: D::zero(), y: D::zero() }
    }
}

impl R2<f64> {
    pub fn polar(radius: f64, angle: Angle) -> Self {
        R2 { x: radius * angle.cos(), y: radius * angle.sin() }
    }

    /// The point at infinity in direction `angle`: each coordinate is `±inf` along axes where
    /// the direction has a non-zero component, `0` otherwise.
    pub fn at_infinity(angle: Angle) -> Self {
        let u = angle.unit();
        let inf = |c: f64| if c.abs() < 1e-12 { 0. } else { c.signum() * f64::INFINITY };
        R2 { x: inf(u.x), y: inf(u.y) }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn radius(&self) -> f64 {
        if self.is_finite() {
            self.x.hypot(self.y)
        } else {
            f64::INFINITY
        }
    }

    pub fn angle(&self) -> Angle {
        Angle::of(*self)
    }

    pub fn norm2(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, o: &R2<f64>) -> f64 {
        self.x * o.x + self.y * o.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(&self, o: &R2<f64>) -> f64 {
        self.x * o.y - self.y * o.x
    }

    /// Rotated a quarter turn counter-clockwise.
    pub fn perp(&self) -> R2<f64> {
        R2 { x: -self.y, y: self.x }
    }

    pub fn distance(&self, o: &R2<f64>) -> f64 {
        (*self - *o).norm()
    }

    pub fn lerp(&self, o: &R2<f64>, t: f64) -> R2<f64> {
        *self + (*o - *self) * t
    }

    /// Lexicographic (x, then y) ordering key.
    pub fn key(&self) -> (ordered_float::OrderedFloat<f64>, ordered_float::OrderedFloat<f64>) {
        (self.x.into(), self.y.into())
    }
}

impl AbsDiffEq for R2<f64> {
    type Epsilon = f64;
    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for R2<f64> {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }
    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative) && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}

impl<D: Add<Output = D>> Add for R2<D> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<D: Sub<Output = D>> Sub for R2<D> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<D: Mul<Output = D>> Mul for R2<D> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
        }
    }
}

impl<D: Mul<D, Output = D> + Clone> Mul<D> for R2<D> {
    type Output = Self;
    fn mul(self, rhs: D) -> Self::Output {
        R2 {
            x: self.x * rhs.clone(),
            y: self.y * rhs,
        }
    }
}

impl<D: Div<D, Output = D> + Clone> Div<D> for R2<D> {
    type Output = Self;
    fn div(self, rhs: D) -> Self::Output {
        R2 {
            x: self.x / rhs.clone(),
            y: self.y / rhs,
        }
    }
}

impl<D: Neg<Output = D>> Neg for R2<D> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        R2 { x: -self.x, y: -self.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn display() {
        assert_eq!(R2 { x: -1., y: 1. }.to_string(), "(-1, 1)");
        assert_eq!(R2 { x: 0.5, y: 2. }.to_string(), "(0.5, 2)");
    }

    #[test]
    fn polar_view() {
        let p = R2::polar(2., Angle::degrees(90.));
        assert_eq!(p, R2 { x: 0., y: 2. });
        assert_relative_eq!(p.radius(), 2.);
        assert_relative_eq!(p.angle().to_turns(), 0.25);
        let q = R2 { x: 3., y: -4. };
        assert_relative_eq!(q.radius(), 5.);
        assert_relative_eq!(R2::polar(q.radius(), q.angle()), q, epsilon = 1e-12);
    }

    #[test]
    fn infinity() {
        let p = R2::at_infinity(Angle::degrees(180.));
        assert_eq!(p.x, f64::NEG_INFINITY);
        assert_eq!(p.y, 0.);
        assert_eq!(p.radius(), f64::INFINITY);
        let q = R2::at_infinity(Angle::degrees(45.));
        assert!(q.x.is_infinite() && q.y.is_infinite());
        assert!(!q.is_finite());
    }
}
