//! Subsets of the real line: finite unions of intervals.

use std::{
    fmt::{self, Display},
    ops::{BitAnd, BitOr, Not, Sub},
    str::FromStr,
};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::ShapeError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
    pub lo_closed: bool,
    pub hi_closed: bool,
}

impl Interval {
    /// Infinite endpoints are always open.
    pub fn new(lo: f64, hi: f64, lo_closed: bool, hi_closed: bool) -> Self {
        Interval { lo, hi, lo_closed: lo_closed && lo.is_finite(), hi_closed: hi_closed && hi.is_finite() }
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi || (self.lo == self.hi && !(self.lo_closed && self.hi_closed))
    }

    pub fn is_point(&self) -> bool {
        self.lo == self.hi && !self.is_empty()
    }

    pub fn contains(&self, x: f64) -> bool {
        (x > self.lo || (x == self.lo && self.lo_closed)) && (x < self.hi || (x == self.hi && self.hi_closed))
    }

    pub fn length(&self) -> f64 {
        self.hi - self.lo
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_point() {
            return write!(f, "{{{}}}", self.lo);
        }
        write!(
            f,
            "{}{}, {}{}",
            if self.lo_closed { '[' } else { '(' },
            self.lo,
            self.hi,
            if self.hi_closed { ']' } else { ')' },
        )
    }
}

/// Finite union of disjoint, non-adjacent intervals, sorted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubSetR1 {
    intervals: Vec<Interval>,
}

impl SubSetR1 {
    pub fn new(intervals: impl IntoIterator<Item = Interval>) -> Self {
        let sorted = intervals
            .into_iter()
            .filter(|iv| !iv.is_empty())
            .sorted_by_key(|iv| (OrderedFloat(iv.lo), !iv.lo_closed));
        let mut merged: Vec<Interval> = vec![];
        for iv in sorted {
            match merged.last_mut() {
                Some(cur) if iv.lo < cur.hi || (iv.lo == cur.hi && (cur.hi_closed || iv.lo_closed)) => {
                    if iv.hi > cur.hi {
                        cur.hi = iv.hi;
                        cur.hi_closed = iv.hi_closed;
                    } else if iv.hi == cur.hi {
                        cur.hi_closed |= iv.hi_closed;
                    }
                }
                _ => merged.push(iv),
            }
        }
        SubSetR1 { intervals: merged }
    }

    pub fn empty() -> Self {
        SubSetR1::default()
    }

    pub fn whole() -> Self {
        SubSetR1 { intervals: vec![Interval::new(f64::NEG_INFINITY, f64::INFINITY, false, false)] }
    }

    pub fn closed(lo: f64, hi: f64) -> Self {
        Self::new([Interval::new(lo, hi, true, true)])
    }

    pub fn open(lo: f64, hi: f64) -> Self {
        Self::new([Interval::new(lo, hi, false, false)])
    }

    pub fn point(x: f64) -> Self {
        Self::closed(x, x)
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_whole(&self) -> bool {
        matches!(self.intervals.as_slice(), [iv] if iv.lo == f64::NEG_INFINITY && iv.hi == f64::INFINITY)
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|iv| iv.contains(x))
    }

    pub fn infimum(&self) -> Option<f64> {
        self.intervals.first().map(|iv| iv.lo)
    }

    pub fn supremum(&self) -> Option<f64> {
        self.intervals.last().map(|iv| iv.hi)
    }

    /// Total length.
    pub fn measure(&self) -> f64 {
        self.intervals.iter().map(|iv| iv.length()).sum()
    }

    pub fn union(&self, o: &SubSetR1) -> SubSetR1 {
        Self::new(self.intervals.iter().chain(o.intervals.iter()).copied())
    }

    pub fn intersection(&self, o: &SubSetR1) -> SubSetR1 {
        let pieces = self.intervals.iter().cartesian_product(o.intervals.iter()).map(|(a, b)| {
            let (lo, lo_closed) = if a.lo > b.lo {
                (a.lo, a.lo_closed)
            } else if b.lo > a.lo {
                (b.lo, b.lo_closed)
            } else {
                (a.lo, a.lo_closed && b.lo_closed)
            };
            let (hi, hi_closed) = if a.hi < b.hi {
                (a.hi, a.hi_closed)
            } else if b.hi < a.hi {
                (b.hi, b.hi_closed)
            } else {
                (a.hi, a.hi_closed && b.hi_closed)
            };
            Interval::new(lo, hi, lo_closed, hi_closed)
        });
        Self::new(pieces)
    }

    pub fn complement(&self) -> SubSetR1 {
        let mut gaps = vec![];
        let (mut lo, mut lo_closed) = (f64::NEG_INFINITY, false);
        for iv in &self.intervals {
            gaps.push(Interval::new(lo, iv.lo, lo_closed, !iv.lo_closed));
            lo = iv.hi;
            lo_closed = !iv.hi_closed;
        }
        gaps.push(Interval::new(lo, f64::INFINITY, lo_closed, false));
        Self::new(gaps)
    }
}

impl Display for SubSetR1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            write!(f, "{{}}")
        } else if self.intervals.iter().all(|iv| iv.is_point()) {
            write!(f, "{{{}}}", self.intervals.iter().map(|iv| iv.lo).join(", "))
        } else {
            write!(f, "{}", self.intervals.iter().join(" U "))
        }
    }
}

fn parse_num(s: &str) -> Result<f64, ShapeError> {
    s.trim().parse::<f64>().map_err(|_| ShapeError::Parse(s.to_string()))
}

impl FromStr for SubSetR1 {
    type Err = ShapeError;

    /// Parses the forms produced by `Display`: `{}`, `{a, b}`, `[a, b)`, `(-inf, inf)`, and
    /// unions of those joined by `U`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ShapeError::Parse(s.to_string());
        let mut intervals = vec![];
        for part in s.split('U').map(str::trim) {
            let (open, body, close) = match (part.chars().next(), part.chars().last()) {
                (Some(o), Some(c)) if part.len() >= 2 && o.is_ascii() && c.is_ascii() => (o, &part[1..part.len() - 1], c),
                _ => return Err(err()),
            };
            match (open, close) {
                ('{', '}') => {
                    if !body.trim().is_empty() {
                        for x in body.split(',') {
                            let x = parse_num(x)?;
                            intervals.push(Interval::new(x, x, true, true));
                        }
                    }
                }
                ('[' | '(', ']' | ')') => {
                    let (lo, hi) = body.split(',').collect_tuple().ok_or_else(err)?;
                    let (lo, hi) = (parse_num(lo)?, parse_num(hi)?);
                    if lo > hi {
                        return Err(err());
                    }
                    intervals.push(Interval::new(lo, hi, open == '[', close == ']'));
                }
                _ => return Err(err()),
            }
        }
        Ok(SubSetR1::new(intervals))
    }
}

impl PartialEq<str> for SubSetR1 {
    /// Text that doesn't parse is simply unequal.
    fn eq(&self, other: &str) -> bool {
        other.parse::<SubSetR1>().map_or(false, |o| o == *self)
    }
}

impl PartialEq<&str> for SubSetR1 {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl BitOr for &SubSetR1 {
    type Output = SubSetR1;
    fn bitor(self, rhs: &SubSetR1) -> SubSetR1 {
        self.union(rhs)
    }
}

impl BitAnd for &SubSetR1 {
    type Output = SubSetR1;
    fn bitand(self, rhs: &SubSetR1) -> SubSetR1 {
        self.intersection(rhs)
    }
}

impl Sub for &SubSetR1 {
    type Output = SubSetR1;
    fn sub(self, rhs: &SubSetR1) -> SubSetR1 {
        self.intersection(&rhs.complement())
    }
}

impl Not for &SubSetR1 {
    type Output = SubSetR1;
    fn not(self) -> SubSetR1 {
        self.complement()
    }
}

impl BitOr for SubSetR1 {
    type Output = SubSetR1;
    fn bitor(self, rhs: SubSetR1) -> SubSetR1 {
        self.union(&rhs)
    }
}

impl BitAnd for SubSetR1 {
    type Output = SubSetR1;
    fn bitand(self, rhs: SubSetR1) -> SubSetR1 {
        self.intersection(&rhs)
    }
}

impl Not for SubSetR1 {
    type Output = SubSetR1;
    fn not(self) -> SubSetR1 {
        self.complement()
    }
}
