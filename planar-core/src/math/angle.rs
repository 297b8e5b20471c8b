use std::{
    f64::consts::TAU,
    fmt::{self, Display},
    ops::{Add, Neg, Sub},
};

use serde::{Deserialize, Serialize};

use crate::r2::R2;

/// An angle, stored in turns (one turn is a full rotation).
///
/// Multiples of a quarter turn evaluate `cos`/`sin` exactly, so that axis-aligned
/// rotations and regular polygons land on exact coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.);
    pub const QUARTER: Angle = Angle(0.25);
    pub const HALF: Angle = Angle(0.5);

    pub fn turns(turns: f64) -> Self {
        Angle(turns)
    }

    pub fn degrees(degrees: f64) -> Self {
        Angle(degrees / 360.)
    }

    pub fn radians(radians: f64) -> Self {
        Angle(radians / TAU)
    }

    /// Direction of a vector, in `[0, 1)` turns.
    pub fn of(v: R2<f64>) -> Self {
        Angle(v.y.atan2(v.x) / TAU).normalized()
    }

    pub fn to_turns(self) -> f64 {
        self.0
    }

    pub fn to_degrees(self) -> f64 {
        self.0 * 360.
    }

    pub fn to_radians(self) -> f64 {
        self.0 * TAU
    }

    /// Equivalent angle in `[0, 1)` turns.
    pub fn normalized(self) -> Self {
        let t = self.0.rem_euclid(1.);
        Angle(if t >= 1. { 0. } else { t })
    }

    /// Signed difference `self - other`, wrapped into `(-1/2, 1/2]` turns.
    pub fn delta(self, other: Angle) -> f64 {
        let d = (self.0 - other.0).rem_euclid(1.);
        if d > 0.5 { d - 1. } else { d }
    }

    fn quarter(self) -> Option<u8> {
        let q = self.normalized().0 * 4.;
        if q.fract() == 0. { Some(q as u8) } else { None }
    }

    pub fn cos(self) -> f64 {
        match self.quarter() {
            Some(0) => 1.,
            Some(1) | Some(3) => 0.,
            Some(2) => -1.,
            _ => self.to_radians().cos(),
        }
    }

    pub fn sin(self) -> f64 {
        match self.quarter() {
            Some(0) | Some(2) => 0.,
            Some(1) => 1.,
            Some(3) => -1.,
            _ => self.to_radians().sin(),
        }
    }

    /// Unit vector pointing in this direction.
    pub fn unit(self) -> R2<f64> {
        R2 { x: self.cos(), y: self.sin() }
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0 - rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

impl Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.to_degrees())
    }
}
