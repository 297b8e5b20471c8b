use log::trace;

use crate::bool2d::subset::SubSetR2::{self, *};

/// Rewrites applied until nothing changes.
const MAX_PASSES: usize = 64;

impl SubSetR2 {
    /// Equivalent expression with negations pushed down to the leaves (shapes absorb them by
    /// inverting), complementary operands collapsed, and absorbed operands dropped.
    ///
    /// Purely symbolic: no curve is intersected with another.
    pub fn simplify(&self) -> SubSetR2 {
        let mut current = self.clone();
        for pass in 0..MAX_PASSES {
            let next = step(&current);
            if next.same(&current) {
                return next;
            }
            trace!("simplify pass {}: {}", pass, next);
            current = next;
        }
        current
    }
}

fn step(set: &SubSetR2) -> SubSetR2 {
    match set {
        Not(inner) => negate(&step(inner)),
        And(operands) => absorb(SubSetR2::intersect(operands.iter().map(step))),
        Or(operands) => absorb(SubSetR2::unite(operands.iter().map(step))),
        leaf => leaf.clone(),
    }
}

/// Complement, pushed through unions and intersections.
pub(crate) fn negate(set: &SubSetR2) -> SubSetR2 {
    match set {
        Empty => Whole,
        Whole => Empty,
        Point(_) | Curve(_) => Not(Box::new(set.clone())),
        Shape(shape) => shape.invert(),
        Not(inner) => (**inner).clone(),
        And(operands) => SubSetR2::unite(operands.iter().map(negate)),
        Or(operands) => SubSetR2::intersect(operands.iter().map(negate)),
    }
}

fn has_complementary_pair(operands: &[SubSetR2]) -> bool {
    operands.iter().any(|x| {
        let complement = negate(x);
        operands.iter().any(|y| y.same(&complement))
    })
}

/// `X | !X = Whole`, `X & !X = Empty`, `X & (X | Y) = X`, `X | (X & Y) = X`.
fn absorb(set: SubSetR2) -> SubSetR2 {
    match &set {
        And(operands) if has_complementary_pair(operands) => Empty,
        Or(operands) if has_complementary_pair(operands) => Whole,
        And(operands) => {
            let kept = operands.iter().filter(|o| !absorbed(o, operands, false)).cloned();
            SubSetR2::intersect(kept.collect::<Vec<_>>())
        }
        Or(operands) => {
            let kept = operands.iter().filter(|o| !absorbed(o, operands, true)).cloned();
            SubSetR2::unite(kept.collect::<Vec<_>>())
        }
        _ => set,
    }
}

/// `operand` is a nested `Or` (inside an `And`) or `And` (inside an `Or`) sharing an operand
/// with its siblings.
fn absorbed(operand: &SubSetR2, siblings: &[SubSetR2], in_union: bool) -> bool {
    let nested = match (operand, in_union) {
        (Or(nested), false) | (And(nested), true) => nested,
        _ => return false,
    };
    siblings.iter().any(|s| !s.same(operand) && nested.iter().any(|n| n.same(s)))
}
