use derive_more::Deref;
use itertools::Itertools;
use log::{debug, warn};
use nalgebra::{Matrix2, Vector2};
use ordered_float::OrderedFloat;

use crate::{
    error::GeometryError,
    geometry::{piecewise::PiecewiseCurve, segment::Segment},
    math::{
        polynomial::Polynomial,
        tol::{BOUNDARY_EPS, PARAM_EPS, POINT_EPS},
    },
    r2::R2,
};

/// Shared sub-arc of two curves: `((ta0, ta1), (tb0, tb1))`, where `a(ta0) == b(tb0)` and
/// `a(ta1) == b(tb1)`.
pub type Overlap = ((f64, f64), (f64, f64));

/// Where two segments meet, in local parameters `(ta, tb)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentHits {
    pub points: Vec<(f64, f64)>,
    pub overlap: Option<Overlap>,
}

/// Where two piecewise curves meet, in global parameters: sorted, deduplicated `(ta, tb)`
/// pairs, and the maximal shared arcs. Points strictly inside a shared arc are not listed;
/// its endpoints are.
#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct Intersections {
    #[deref]
    pub pairs: Vec<(f64, f64)>,
    pub overlaps: Vec<Overlap>,
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= PARAM_EPS
}

fn in_unit(t: f64) -> bool {
    (-PARAM_EPS..=1. + PARAM_EPS).contains(&t)
}

/// All meeting points of two segments.
pub fn segment_pair(a: &Segment, b: &Segment) -> Result<SegmentHits, GeometryError> {
    if !a.bbox().intersects(&b.bbox(), BOUNDARY_EPS) {
        return Ok(SegmentHits::default());
    }
    if a.approx_eq(b, POINT_EPS) {
        return Ok(SegmentHits { points: vec![(0., 0.), (1., 1.)], overlap: Some(((0., 1.), (0., 1.))) });
    }
    if a.approx_eq(&b.reversed(), POINT_EPS) {
        return Ok(SegmentHits { points: vec![(0., 1.), (1., 0.)], overlap: Some(((0., 1.), (1., 0.))) });
    }
    match (a.is_line(), b.is_line()) {
        (true, true) => Ok(line_line(a, b)),
        (true, false) => line_curve(a, b),
        (false, true) => line_curve(b, a).map(|hits| SegmentHits {
            points: hits.points.into_iter().map(|(s, t)| (t, s)).collect(),
            overlap: hits.overlap.map(|(s, t)| (t, s)),
        }),
        (false, false) => curve_curve(a, b),
    }
}

fn line_line(a: &Segment, b: &Segment) -> SegmentHits {
    let (a0, a1, b0, b1) = (a.start(), a.end(), b.start(), b.end());
    let da = a1 - a0;
    let db = b1 - b0;
    let w = b0 - a0;
    let den = da.cross(&db);
    if den.abs() > 1e-12 * da.norm() * db.norm() {
        let s = w.cross(&db) / den;
        let t = w.cross(&da) / den;
        return if in_unit(s) && in_unit(t) {
            SegmentHits { points: vec![(s.clamp(0., 1.), t.clamp(0., 1.))], overlap: None }
        } else {
            SegmentHits::default()
        };
    }
    // Parallel: disjoint unless collinear
    let len2 = da.norm2();
    if len2 == 0. || da.cross(&w).abs() / len2.sqrt() > POINT_EPS {
        return SegmentHits::default();
    }
    let proj_a = |p: R2<f64>| (p - a0).dot(&da) / len2;
    let proj_b = |p: R2<f64>| (p - b0).dot(&db) / db.norm2();
    let (u0, u1) = (proj_a(b0), proj_a(b1));
    let lo = u0.min(u1).max(0.);
    let hi = u0.max(u1).min(1.);
    if lo > hi + PARAM_EPS {
        return SegmentHits::default();
    }
    let (tlo, thi) = (proj_b(a.eval(lo)).clamp(0., 1.), proj_b(a.eval(hi)).clamp(0., 1.));
    if hi - lo <= PARAM_EPS {
        return SegmentHits { points: vec![(lo, tlo)], overlap: None };
    }
    SegmentHits { points: vec![(lo, tlo), (hi, thi)], overlap: Some(((lo, hi), (tlo, thi))) }
}

/// Substitutes the curve into the line's implicit equation and solves for the curve parameter.
fn line_curve(line: &Segment, curve: &Segment) -> Result<SegmentHits, GeometryError> {
    let a0 = line.start();
    let d = line.end() - a0;
    let n = d.perp();
    let (px, py) = curve.polynomials();
    let f = &(&(&px - &Polynomial::constant(a0.x)) * n.x) + &(&(&py - &Polynomial::constant(a0.y)) * n.y);
    let scale = d.norm() * curve.bbox().size().max(d.norm());
    if f.is_zero(POINT_EPS * scale) {
        return Err(GeometryError::degenerate(format!("{} lies along {}", curve, line)));
    }
    let points = f
        .roots_in(0., 1.)
        .into_iter()
        .filter_map(|t| {
            let s = (curve.eval(t) - a0).dot(&d) / d.norm2();
            in_unit(s).then(|| (s.clamp(0., 1.), t))
        })
        .collect();
    Ok(SegmentHits { points, overlap: None })
}

/// Shared sub-arc of two curved segments, if their endpoints lie on each other and the
/// sections between them coincide.
fn curve_overlap(a: &Segment, b: &Segment) -> Option<Overlap> {
    if a.degree() != b.degree() {
        return None;
    }
    let mut ends: Vec<(f64, f64)> = vec![];
    for (ta, p) in [(0., a.start()), (1., a.end())] {
        let (tb, dist) = b.closest(&p);
        if dist <= BOUNDARY_EPS {
            ends.push((ta, tb));
        }
    }
    for (tb, p) in [(0., b.start()), (1., b.end())] {
        let (ta, dist) = a.closest(&p);
        if dist <= BOUNDARY_EPS {
            ends.push((ta, tb));
        }
    }
    let ends: Vec<(f64, f64)> = ends
        .into_iter()
        .sorted_by_key(|(ta, _)| OrderedFloat(*ta))
        .dedup_by(|x, y| close(x.0, y.0))
        .collect();
    let (lo, hi) = (*ends.first()?, *ends.last()?);
    if hi.0 - lo.0 <= PARAM_EPS {
        return None;
    }
    a.section(lo.0, hi.0)
        .approx_eq(&b.section(lo.1, hi.1), BOUNDARY_EPS)
        .then_some(((lo.0, hi.0), (lo.1, hi.1)))
}

fn refine(a: &Segment, b: &Segment, s0: f64, t0: f64) -> Option<(f64, f64, f64)> {
    let dist = |s: f64, t: f64| a.eval(s).distance(&b.eval(t));
    let mut best = (s0, t0, dist(s0, t0));
    let (mut s, mut t) = (s0, t0);
    for _ in 0..32 {
        let f = a.eval(s) - b.eval(t);
        if f.norm() == 0. {
            break;
        }
        let (da, db) = (a.derivative(s), b.derivative(t));
        let jacobian = Matrix2::new(da.x, -db.x, da.y, -db.y);
        let Some(inv) = jacobian.try_inverse() else { break };
        let step = inv * Vector2::new(f.x, f.y);
        s = (s - step.x).clamp(0., 1.);
        t = (t - step.y).clamp(0., 1.);
        let d = dist(s, t);
        if d < best.2 {
            best = (s, t, d);
        }
    }
    if best.2 > POINT_EPS * 1e-3 {
        let touch = refine_touch(a, b, best.0, best.1);
        if touch.2 < best.2 {
            best = touch;
        }
    }
    (best.2 <= BOUNDARY_EPS).then_some(best)
}

/// Closest approach of two curves near `(s0, t0)`: Newton on "`a(s)` is the foot of `b(t)`, and
/// their tangents are parallel". Where the curves touch, `a(s) = b(t)` has a singular Jacobian
/// but this system does not.
fn refine_touch(a: &Segment, b: &Segment, s0: f64, t0: f64) -> (f64, f64, f64) {
    let dist = |s: f64, t: f64| a.eval(s).distance(&b.eval(t));
    let mut best = (s0, t0, dist(s0, t0));
    let (mut s, mut t) = (s0, t0);
    for _ in 0..32 {
        let d = a.eval(s) - b.eval(t);
        let (da, db) = (a.derivative(s), b.derivative(t));
        let (dda, ddb) = (a.second_derivative(s), b.second_derivative(t));
        let g = Vector2::new(d.dot(&db), da.cross(&db));
        if g.norm() == 0. {
            break;
        }
        let jacobian = Matrix2::new(da.dot(&db), d.dot(&ddb) - db.norm2(), dda.cross(&db), da.cross(&ddb));
        let Some(inv) = jacobian.try_inverse() else { break };
        let step = inv * g;
        s = (s - step.x).clamp(0., 1.);
        t = (t - step.y).clamp(0., 1.);
        let d = dist(s, t);
        if d < best.2 {
            best = (s, t, d);
        }
    }
    best
}

/// Box pairs smaller than this are handed to Newton's method instead of being split further.
const CONTACT_SIZE: f64 = 1e-4;

/// Hits closer than this in both parameters may be one contact.
const CLUSTER_GAP: f64 = 1e-3;

/// Bounding-box subdivision down to contact-sized boxes, each polished by Newton's method.
///
/// Near a tangency the curves stay within tolerance of each other along a stretch much longer
/// than the final precision. A box pair whose Newton refinement lands inside it, or on a root
/// already found nearby, is settled without further splitting.
fn curve_curve(a: &Segment, b: &Segment) -> Result<SegmentHits, GeometryError> {
    if let Some(overlap) = curve_overlap(a, b) {
        let ((s0, s1), (t0, t1)) = overlap;
        return Ok(SegmentHits { points: vec![(s0, t0), (s1, t1)], overlap: Some(overlap) });
    }
    const MAX_LIVE: usize = 4096;
    let mut candidates: Vec<(f64, f64, f64)> = vec![];
    let mut stack = vec![((0., 1., a.clone()), (0., 1., b.clone()), 0usize)];
    while let Some(((a0, a1, sa), (b0, b1, sb), depth)) = stack.pop() {
        let (ba, bb) = (sa.bbox(), sb.bbox());
        if !ba.intersects(&bb, POINT_EPS) {
            continue;
        }
        if stack.len() + candidates.len() > MAX_LIVE {
            return Err(GeometryError::degenerate(format!("subdividing {} against {} did not converge", a, b)));
        }
        let (sm, tm) = ((a0 + a1) / 2., (b0 + b1) / 2.);
        if ba.size() < CONTACT_SIZE && bb.size() < CONTACT_SIZE {
            if let Some(hit) = refine(a, b, sm, tm) {
                let within = |pad_a: f64, pad_b: f64| {
                    (a0 - pad_a..=a1 + pad_a).contains(&hit.0) && (b0 - pad_b..=b1 + pad_b).contains(&hit.1)
                };
                if within(a1 - a0, b1 - b0) {
                    candidates.push(hit);
                    continue;
                }
                // Converged onto a neighbouring root already found.
                let known = candidates
                    .iter()
                    .any(|c| (c.0 - hit.0).abs() < CLUSTER_GAP && (c.1 - hit.1).abs() < CLUSTER_GAP);
                if known && within(CLUSTER_GAP, CLUSTER_GAP) {
                    continue;
                }
            }
        }
        if (ba.size() < 1e-9 && bb.size() < 1e-9) || depth >= 60 {
            candidates.extend(refine(a, b, sm, tm));
            continue;
        }
        if ba.size() >= bb.size() {
            let (l, r) = sa.split(0.5);
            stack.push(((a0, sm, l), (b0, b1, sb.clone()), depth + 1));
            stack.push(((sm, a1, r), (b0, b1, sb), depth + 1));
        } else {
            let (l, r) = sb.split(0.5);
            stack.push(((a0, a1, sa.clone()), (b0, tm, l), depth + 1));
            stack.push(((a0, a1, sa), (tm, b1, r), depth + 1));
        }
    }
    let refined: Vec<(f64, f64, f64)> = candidates
        .into_iter()
        .sorted_by_key(|(s, t, _)| (OrderedFloat(*s), OrderedFloat(*t)))
        .collect();
    // Near a tangency, many neighbouring boxes survive; a run of candidates joined by
    // near-contact is one touching point.
    let mut clusters: Vec<Vec<(f64, f64, f64)>> = vec![];
    for cand in refined {
        let joined = clusters.last().and_then(|c| c.last()).map_or(false, |prev| {
            let (sm, tm) = ((prev.0 + cand.0) / 2., (prev.1 + cand.1) / 2.);
            (cand.0 - prev.0).abs() < CLUSTER_GAP && (cand.1 - prev.1).abs() < CLUSTER_GAP && a.eval(sm).distance(&b.eval(tm)) <= BOUNDARY_EPS * 10.
        });
        match clusters.last_mut() {
            Some(cluster) if joined => cluster.push(cand),
            _ => clusters.push(vec![cand]),
        }
    }
    let points: Vec<(f64, f64)> = clusters
        .into_iter()
        .filter_map(|cluster| cluster.into_iter().min_by(|x, y| x.2.total_cmp(&y.2)))
        .map(|(s, t, _)| (s, t))
        .collect();
    if points.len() > a.degree() * b.degree() {
        return Err(GeometryError::degenerate(format!(
            "{} and {} meet at {} points, more than their degrees allow",
            a,
            b,
            points.len()
        )));
    }
    Ok(SegmentHits { points, overlap: None })
}

fn wrap(curve: &PiecewiseCurve, t: f64) -> f64 {
    if curve.is_closed() && close(t, curve.last_knot()) {
        curve.first_knot()
    } else {
        t
    }
}

/// All meeting points of two curves, in global parameters.
pub fn intersect(a: &PiecewiseCurve, b: &PiecewiseCurve) -> Result<Intersections, GeometryError> {
    if !a.bbox().intersects(&b.bbox(), BOUNDARY_EPS) {
        return Ok(Intersections::default());
    }
    let mut pairs: Vec<(f64, f64)> = vec![];
    let mut overlaps: Vec<Overlap> = vec![];
    for (i, sa) in a.segments().iter().enumerate() {
        for (j, sb) in b.segments().iter().enumerate() {
            let hits = segment_pair(sa, sb)?;
            pairs.extend(hits.points.iter().map(|(s, t)| (a.global(i, *s), b.global(j, *t))));
            if let Some(((s0, s1), (t0, t1))) = hits.overlap {
                overlaps.push(((a.global(i, s0), a.global(i, s1)), (b.global(j, t0), b.global(j, t1))));
            }
        }
    }
    let pairs: Vec<(f64, f64)> = pairs
        .into_iter()
        .map(|(ta, tb)| (wrap(a, ta), wrap(b, tb)))
        .sorted_by_key(|(ta, tb)| (OrderedFloat(*ta), OrderedFloat(*tb)))
        .dedup_by(|x, y| close(x.0, y.0) && close(x.1, y.1))
        .collect();

    // Join overlaps that continue each other along both curves
    let mut merged: Vec<Overlap> = vec![];
    for ov in overlaps.into_iter().sorted_by_key(|((ta0, _), _)| OrderedFloat(*ta0)) {
        match merged.last_mut() {
            Some(((_, ta1), (_, tb1))) if close(*ta1, ov.0 .0) && close(*tb1, ov.1 .0) => {
                *ta1 = ov.0 .1;
                *tb1 = ov.1 .1;
            }
            _ => merged.push(ov),
        }
    }
    let pairs: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter(|(ta, _)| !merged.iter().any(|((ta0, ta1), _)| *ta > ta0 + PARAM_EPS && *ta < ta1 - PARAM_EPS))
        .collect();
    if !merged.is_empty() {
        debug!("{} shared arcs between curves: {:?}", merged.len(), merged);
    }
    Ok(Intersections { pairs, overlaps: merged })
}

/// Points where a curve meets itself, other than the shared endpoints of consecutive
/// segments: `(segment, segment, point)`.
pub fn self_intersections(curve: &PiecewiseCurve) -> Result<Vec<(usize, usize, R2<f64>)>, GeometryError> {
    let n = curve.len();
    let closed = curve.is_closed();
    let segments = curve.segments();
    let near = |t: f64, v: f64| (t - v).abs() <= BOUNDARY_EPS;
    let mut found = vec![];
    for i in 0..n {
        for j in (i + 1)..n {
            let hits = segment_pair(&segments[i], &segments[j])?;
            let next = j == i + 1;
            let wraps = closed && i == 0 && j == n - 1;
            if hits.overlap.is_some() {
                found.push((i, j, segments[i].eval(hits.points[0].0)));
                continue;
            }
            for (s, t) in hits.points {
                let allowed = (next && near(s, 1.) && near(t, 0.)) || (wraps && near(s, 0.) && near(t, 1.));
                if !allowed {
                    found.push((i, j, segments[i].eval(s)));
                }
            }
        }
    }
    if !found.is_empty() {
        warn!("curve meets itself at {:?}", found);
    }
    Ok(found)
}
