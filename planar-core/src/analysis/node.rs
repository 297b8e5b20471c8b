use std::collections::BTreeMap;
use std::fmt::Display;

use crate::r2::R2;

/// Meeting point of edges in the boundary graph: a knot of some curve, or a point where curves
/// cross or touch.
#[derive(Clone, Debug)]
pub struct Node {
    pub idx: usize,
    pub p: R2<f64>,
    /// Number of coincident points merged into this one.
    pub n: usize,
    /// Whether `p` is a curve's knot, taken verbatim rather than averaged.
    pub exact: bool,
    /// Boundary coordinate of this node on each curve through it, keyed by curve index.
    pub curve_coords: BTreeMap<usize, f64>,
    /// Indices of the kept edges leaving this node.
    pub edges: Vec<usize>,
}

impl Node {
    pub fn new(idx: usize, p: R2<f64>, exact: bool, curve: usize, coord: f64) -> Self {
        Node { idx, p, n: 1, exact, curve_coords: BTreeMap::from([(curve, coord)]), edges: vec![] }
    }

    pub fn coord(&self, curve: usize) -> Option<f64> {
        self.curve_coords.get(&curve).copied()
    }

    /// Folds in another estimate of this point, averaging positions. The first exact point
    /// merged in fixes the position for good.
    pub fn merge(&mut self, o: R2<f64>, exact: bool, curve: usize, coord: f64) {
        if exact && !self.exact {
            self.p = o;
            self.exact = true;
        } else if !self.exact {
            let n = self.n as f64;
            self.p = self.p * (n / (n + 1.)) + o / (n + 1.);
        }
        self.n += 1;
        self.curve_coords.entry(curve).or_insert(coord);
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "N{}({:.3}, {:.3}: {})",
            self.idx,
            self.p.x,
            self.p.y,
            self.curve_coords.iter().map(|(curve, coord)| format!("C{}({:.3})", curve, coord)).collect::<Vec<_>>().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn merge() {
        let mut node = Node::new(0, R2 { x: 1., y: 1. }, false, 0, 0.5);
        node.merge(R2 { x: 1., y: 1.000001 }, false, 1, 2.);
        node.merge(R2 { x: 1., y: 1. }, false, 0, 0.75);
        assert_eq!(node.n, 3);
        assert_relative_eq!(node.p.y, 1. + 1e-6 / 3., epsilon = 1e-12);
        assert_eq!(node.coord(0), Some(0.5));
        assert_eq!(node.coord(1), Some(2.));
        assert_eq!(node.coord(2), None);
        assert_eq!(node.to_string(), "N0(1.000, 1.000: C0(0.500), C1(2.000))");
    }

    #[test]
    fn knots_stay_put() {
        let mut node = Node::new(0, R2 { x: -1., y: -7.7e-9 }, false, 0, 3.5);
        node.merge(R2 { x: -1., y: 0. }, true, 1, 2.);
        node.merge(R2 { x: -1., y: 5e-9 }, false, 2, 0.25);
        node.merge(R2 { x: -1., y: 1e-16 }, true, 3, 1.);
        assert!(node.exact);
        assert_eq!(node.p, R2 { x: -1., y: 0. });
        assert_eq!(node.n, 4);
    }
}
