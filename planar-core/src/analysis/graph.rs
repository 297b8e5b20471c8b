use std::cmp::Ordering;

use itertools::Itertools;
use log::{debug, trace, warn};
use ordered_float::OrderedFloat;

use crate::{
    analysis::{boundary_coord::BoundaryCoord, contains::Contains, edge::Edge, intersect::intersect, node::Node},
    bool2d::{shape::SimpleShape, subset::SubSetR2},
    error::{Error, ReconstructionError},
    jordan::JordanCurve,
    math::{
        angle::Angle,
        tol::{BOUNDARY_EPS, MERGE_THRESHOLD, PARAM_EPS, POINT_EPS},
    },
    r2::R2,
    segment::Segment,
};

/// Turns closer than this count as ties.
const TURN_EPS: f64 = 1e-9;

/// Planar graph of a set of Jordan curves: nodes at every knot and wherever curves meet, edges
/// along the arcs between consecutive nodes of each curve.
#[derive(Clone, Debug)]
pub struct Graph<'a> {
    pub curves: &'a [JordanCurve],
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Parameters where each curve gets cut: its own knots, its crossings with the other curves,
/// and other curves' knots lying on it (so that shared arcs are cut identically on both
/// curves).
fn cut_coords(curves: &[JordanCurve]) -> Result<Vec<Vec<f64>>, Error> {
    let mut cuts: Vec<Vec<f64>> = curves
        .iter()
        .map(|c| {
            let knots = c.curve().knots();
            knots[..knots.len() - 1].to_vec()
        })
        .collect();
    for (i, j) in (0..curves.len()).tuple_combinations() {
        let hits = intersect(curves[i].curve(), curves[j].curve())?;
        for (ta, tb) in hits.iter() {
            cuts[i].push(*ta);
            cuts[j].push(*tb);
        }
        if hits.overlaps.is_empty() {
            continue;
        }
        for (a, b) in [(i, j), (j, i)] {
            for knot in curves[b].vertices() {
                if let Some((idx, t)) = curves[a].locate(&knot) {
                    cuts[a].push(curves[a].curve().global(idx, t));
                }
            }
        }
    }
    Ok(curves
        .iter()
        .zip(cuts)
        .map(|(jordan, cuts)| {
            let (first, last) = (jordan.curve().first_knot(), jordan.curve().last_knot());
            cuts.into_iter()
                .map(|t| if t >= last - PARAM_EPS { first } else { t })
                .sorted_by_key(|t| OrderedFloat(*t))
                .dedup_by(|a, b| (a - b).abs() <= PARAM_EPS)
                .collect()
        })
        .collect())
}

/// Exact position of the knot at `coord`, if `coord` is one of the curve's knots.
fn knot_point(jordan: &JordanCurve, coord: f64) -> Option<R2<f64>> {
    let curve = jordan.curve();
    let segments = curve.segments();
    curve
        .knots()
        .iter()
        .position(|k| (k - coord).abs() <= PARAM_EPS)
        .map(|idx| segments[idx % segments.len()].start())
}

impl<'a> Graph<'a> {
    pub fn new(curves: &'a [JordanCurve]) -> Result<Self, Error> {
        let cuts = cut_coords(curves)?;
        let mut nodes: Vec<Node> = vec![];
        let mut edges: Vec<Edge> = vec![];
        for (curve_idx, (jordan, coords)) in curves.iter().zip(&cuts).enumerate() {
            trace!("curve {} cut at {:?}", curve_idx, coords);
            let mut node_idxs = vec![];
            for coord in coords {
                let knot = knot_point(jordan, *coord);
                let (p, exact) = match knot {
                    Some(k) => (k, true),
                    None => (jordan.point(*coord), false),
                };
                let idx = match nodes.iter_mut().find(|n| n.p.distance(&p) <= MERGE_THRESHOLD) {
                    Some(node) => {
                        node.merge(p, exact, curve_idx, *coord);
                        node.idx
                    }
                    None => {
                        let idx = nodes.len();
                        nodes.push(Node::new(idx, p, exact, curve_idx, *coord));
                        idx
                    }
                };
                node_idxs.push(idx);
            }
            let n = coords.len();
            for k in 0..n {
                let coord0 = coords[k];
                let coord1 = if k + 1 < n { coords[k + 1] } else { coords[0] + jordan.coord_period() };
                let edge = Edge {
                    idx: edges.len(),
                    curve: curve_idx,
                    node0: node_idxs[k],
                    node1: node_idxs[(k + 1) % n],
                    coord0,
                    coord1,
                    mid: jordan.midpoint(coord0, coord1),
                    fwd: true,
                    visited: false,
                };
                if edge.node0 == edge.node1 && nodes[edge.node0].p.distance(&edge.mid) <= MERGE_THRESHOLD {
                    trace!("skipping vanishing edge {}", edge);
                    continue;
                }
                edges.push(edge);
            }
        }
        debug!("graph of {} curves: {} nodes, {} edges", curves.len(), nodes.len(), edges.len());
        Ok(Graph { curves, nodes, edges })
    }

    /// Keeps the edges separating `set` from its complement (density strictly between 0 and 1
    /// at their midpoints), oriented with `set` on their left. Coincident edges are kept once.
    pub fn classify(&mut self, set: &SubSetR2) {
        let total = self.edges.len();
        let mut kept: Vec<Edge> = vec![];
        for mut edge in self.edges.drain(..) {
            let density = set.density(&edge.mid);
            if density.is_zero() || density.is_one() {
                trace!("dropping {}: density {}", edge, density);
                continue;
            }
            let tangent = Angle::of(edge.tangent(&self.curves[edge.curve], 0.5));
            let left = density.contains_direction(tangent + Angle::QUARTER);
            let right = density.contains_direction(tangent - Angle::QUARTER);
            edge.fwd = match (left, right) {
                (true, false) => true,
                (false, true) => false,
                _ => {
                    warn!("dropping {}: density {} on both sides", edge, density);
                    continue;
                }
            };
            let duplicate = kept.iter().any(|k| {
                k.start_node() == edge.start_node()
                    && k.end_node() == edge.end_node()
                    && k.mid.distance(&edge.mid) <= BOUNDARY_EPS
            });
            if duplicate {
                trace!("dropping {}: coincides with a kept edge", edge);
                continue;
            }
            edge.idx = kept.len();
            kept.push(edge);
        }
        for node in &mut self.nodes {
            node.edges.clear();
        }
        for edge in &kept {
            self.nodes[edge.start_node()].edges.push(edge.idx);
        }
        debug!("kept {} of {} edges", kept.len(), total);
        self.edges = kept;
    }

    /// Turn from `incoming` onto `edge`, in turns. An edge doubling back (at a tangency) ranks
    /// below every real turn, so loops touching at a point stay separate.
    fn turn(&self, edge: usize, incoming: Angle) -> f64 {
        let e = &self.edges[edge];
        let turn = Angle::of(e.leaving(&self.curves[e.curve])).delta(incoming);
        if turn.abs() < 0.5 - TURN_EPS { turn } else { -1. }
    }

    fn chord(&self, edge: usize, incoming: Angle, node: usize) -> f64 {
        let e = &self.edges[edge];
        Angle::of(e.point_at(&self.curves[e.curve], 1e-3) - self.nodes[node].p).delta(incoming)
    }

    /// Orders candidate edges leaving `node` by how far left they turn from `incoming`;
    /// tangent candidates are separated by a short chord along each, then by index (lowest
    /// first).
    fn turn_order(&self, a: usize, b: usize, incoming: Angle, node: usize) -> Ordering {
        let (ta, tb) = (self.turn(a, incoming), self.turn(b, incoming));
        if (ta - tb).abs() > TURN_EPS {
            return ta.total_cmp(&tb);
        }
        let (ca, cb) = (self.chord(a, incoming, node), self.chord(b, incoming, node));
        if (ca - cb).abs() > TURN_EPS {
            return ca.total_cmp(&cb);
        }
        b.cmp(&a)
    }

    /// Walks kept edges into closed loops, always taking the leftmost unvisited edge.
    pub fn traverse(&mut self) -> Result<Vec<Vec<usize>>, ReconstructionError> {
        let mut loops = vec![];
        for start in 0..self.edges.len() {
            if self.edges[start].visited {
                continue;
            }
            self.edges[start].visited = true;
            let origin = self.edges[start].start_node();
            let mut path = vec![start];
            loop {
                let current = &self.edges[path[path.len() - 1]];
                let node = current.end_node();
                if node == origin {
                    break;
                }
                let incoming = Angle::of(current.arriving(&self.curves[current.curve]));
                let next = self.nodes[node]
                    .edges
                    .iter()
                    .copied()
                    .filter(|e| !self.edges[*e].visited)
                    .max_by(|a, b| self.turn_order(*a, *b, incoming, node));
                match next {
                    Some(e) => {
                        self.edges[e].visited = true;
                        path.push(e);
                    }
                    None => {
                        return Err(ReconstructionError::DeadEnd {
                            node: self.nodes[node].to_string(),
                            path: path.iter().map(|e| self.edges[*e].to_string()).collect(),
                            curves: self.curves.len(),
                        })
                    }
                }
            }
            trace!("loop: {}", path.iter().map(|e| self.edges[*e].to_string()).join(", "));
            loops.push(path);
        }
        Ok(loops)
    }

    /// Jordan curve tracing a loop of edges, with endpoints snapped to their nodes. `None` for
    /// loops enclosing no area.
    pub fn assemble(&self, path: &[usize]) -> Result<Option<JordanCurve>, Error> {
        let mut segments: Vec<Segment> = vec![];
        for (prev, next) in path.iter().circular_tuple_windows() {
            let (prev, next) = (&self.edges[*prev], &self.edges[*next]);
            let gap = prev.point_at(&self.curves[prev.curve], 1.).distance(&next.point_at(&self.curves[next.curve], 0.));
            if gap > MERGE_THRESHOLD * 10. {
                return Err(ReconstructionError::Unclosed {
                    path: path.iter().map(|e| self.edges[*e].to_string()).collect(),
                }
                .into());
            }
        }
        for e in path {
            let edge = &self.edges[*e];
            let mut pieces = edge.segments(&self.curves[edge.curve]);
            if let Some(first) = pieces.first_mut() {
                first.ctrl_mut()[0] = self.nodes[edge.start_node()].p;
            }
            if let Some(last) = pieces.last_mut() {
                let end = last.ctrl().len() - 1;
                last.ctrl_mut()[end] = self.nodes[edge.end_node()].p;
            }
            segments.extend(pieces);
        }
        for i in 1..segments.len() {
            let prev_end = segments[i - 1].end();
            segments[i].ctrl_mut()[0] = prev_end;
        }
        if segments.is_empty() {
            return Ok(None);
        }
        let jordan = JordanCurve::from_segments_unchecked(segments)?.canonical();
        if jordan.area().abs() <= POINT_EPS {
            debug!("dropping sliver {}", jordan);
            return Ok(None);
        }
        Ok(Some(jordan))
    }
}

/// Boundary of `set`, traced from the arcs of `curves` (the curves bounding its shapes).
///
/// Each loop keeps its curve when `set` contains the midpoint of any of its edges. Loops whose
/// edges disagree (part of a difference's boundary, say) come out closed.
pub fn reconstruct(set: &SubSetR2, curves: &[JordanCurve]) -> Result<Vec<SimpleShape>, Error> {
    let mut graph = Graph::new(curves)?;
    graph.classify(set);
    let loops = graph.traverse()?;
    let mut shapes = vec![];
    for path in &loops {
        let Some(jordan) = graph.assemble(path)? else { continue };
        let members = path.iter().filter(|e| set.contains(&graph.edges[**e].mid)).count();
        if members > 0 && members < path.len() {
            debug!("{} of {} edges of {} lie in the set; keeping its boundary", members, path.len(), jordan);
        }
        shapes.push(SimpleShape { jordan, boundary: members > 0 });
    }
    debug!("reconstructed {} curves from {} loops", shapes.len(), loops.len());
    Ok(shapes)
}
