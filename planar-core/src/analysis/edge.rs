use std::fmt::Display;

use crate::{jordan::JordanCurve, r2::R2, segment::Segment};

/// Arc of one input curve between consecutive nodes, over boundary coordinates
/// `[coord0, coord1]` (`coord1` may run past the curve's last knot, wrapping around).
#[derive(Debug, Clone)]
pub struct Edge {
    pub idx: usize,
    pub curve: usize,
    pub node0: usize,
    pub node1: usize,
    pub coord0: f64,
    pub coord1: f64,
    pub mid: R2<f64>,
    /// Whether the result boundary runs along the curve's direction; set when classified.
    pub fwd: bool,
    pub visited: bool,
}

impl Edge {
    pub fn coord_span(&self) -> f64 {
        self.coord1 - self.coord0
    }

    pub fn start_node(&self) -> usize {
        if self.fwd { self.node0 } else { self.node1 }
    }

    pub fn end_node(&self) -> usize {
        if self.fwd { self.node1 } else { self.node0 }
    }

    /// Curve parameter at fraction `frac` of the way along the edge, in traversal order.
    fn coord_at(&self, frac: f64) -> f64 {
        let frac = if self.fwd { frac } else { 1. - frac };
        self.coord0 + frac * self.coord_span()
    }

    /// Global parameter on `jordan`, wrapped into its knot range.
    fn local(jordan: &JordanCurve, c: f64) -> f64 {
        let curve = jordan.curve();
        let (first, last) = (curve.first_knot(), curve.last_knot());
        if c > last { c - (last - first) } else { c }
    }

    pub fn point_at(&self, jordan: &JordanCurve, frac: f64) -> R2<f64> {
        jordan.curve().eval(Self::local(jordan, self.coord_at(frac)))
    }

    /// Direction of travel at fraction `frac` of the way along.
    pub fn tangent(&self, jordan: &JordanCurve, frac: f64) -> R2<f64> {
        let d = jordan.curve().direction(Self::local(jordan, self.coord_at(frac)));
        if self.fwd { d } else { -d }
    }

    /// Direction of travel leaving the start node.
    pub fn leaving(&self, jordan: &JordanCurve) -> R2<f64> {
        let curve = jordan.curve();
        if self.fwd {
            curve.direction_after(Self::local(jordan, self.coord0))
        } else {
            -curve.direction_before(Self::local(jordan, self.coord1))
        }
    }

    /// Direction of travel arriving at the end node.
    pub fn arriving(&self, jordan: &JordanCurve) -> R2<f64> {
        let curve = jordan.curve();
        if self.fwd {
            curve.direction_before(Self::local(jordan, self.coord1))
        } else {
            -curve.direction_after(Self::local(jordan, self.coord0))
        }
    }

    /// Segments tracing the edge in traversal order.
    pub fn segments(&self, jordan: &JordanCurve) -> Vec<Segment> {
        let curve = jordan.curve();
        let (first, last) = (curve.first_knot(), curve.last_knot());
        let mut segments = if self.coord1 > last {
            let mut head = curve.section(self.coord0, last);
            head.extend(curve.section(first, self.coord1 - (last - first)));
            head
        } else {
            curve.section(self.coord0, self.coord1)
        };
        if !self.fwd {
            segments = segments.iter().rev().map(|s| s.reversed()).collect();
        }
        segments
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "E{}(C{}: N{}({:.3}) {} N{}({:.3}))",
            self.idx,
            self.curve,
            self.node0,
            self.coord0,
            if self.fwd { "→" } else { "←" },
            self.node1,
            self.coord1,
        )
    }
}
