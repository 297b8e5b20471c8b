use serde::{Deserialize, Serialize};

use crate::r2::R2;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: R2<f64>,
    pub max: R2<f64>,
}

impl BBox {
    pub fn of<'a>(points: impl IntoIterator<Item = &'a R2<f64>>) -> BBox {
        let mut it = points.into_iter();
        let first = it.next().copied().unwrap_or(R2 { x: 0., y: 0. });
        it.fold(BBox { min: first, max: first }, |b, p| b.expand_to(p))
    }

    pub fn expand_to(self, p: &R2<f64>) -> BBox {
        BBox {
            min: R2 { x: self.min.x.min(p.x), y: self.min.y.min(p.y) },
            max: R2 { x: self.max.x.max(p.x), y: self.max.y.max(p.y) },
        }
    }

    pub fn union(&self, o: &BBox) -> BBox {
        self.expand_to(&o.min).expand_to(&o.max)
    }

    pub fn contains(&self, p: &R2<f64>, tol: f64) -> bool {
        p.x >= self.min.x - tol && p.x <= self.max.x + tol && p.y >= self.min.y - tol && p.y <= self.max.y + tol
    }

    pub fn intersects(&self, o: &BBox, tol: f64) -> bool {
        self.min.x <= o.max.x + tol && o.min.x <= self.max.x + tol && self.min.y <= o.max.y + tol && o.min.y <= self.max.y + tol
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Longest side.
    pub fn size(&self) -> f64 {
        self.width().max(self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn overlap() {
        let a = BBox::of(&[R2 { x: 0., y: 0. }, R2 { x: 2., y: 1. }]);
        let b = BBox::of(&[R2 { x: 2., y: 1. }, R2 { x: 3., y: 3. }]);
        let c = BBox::of(&[R2 { x: 2.5, y: -1. }, R2 { x: 3., y: 0.5 }]);
        assert!(a.intersects(&b, 0.));
        assert!(!a.intersects(&c, 0.));
        assert!(a.union(&c).contains(&R2 { x: 3., y: -1. }, 0.));
        assert_eq!(a.size(), 2.);
    }
}
