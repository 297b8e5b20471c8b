use crate::{bool2d::subset::SubSetR2, primitive, r2::R2};

mod disjoint;

fn poly(vertices: &[(f64, f64)]) -> SubSetR2 {
    primitive::polygon(&vertices.iter().map(|v| R2::from(*v)).collect::<Vec<_>>()).unwrap()
}

fn clean(set: SubSetR2) -> SubSetR2 {
    set.clean().unwrap_or_else(|e| panic!("cleaning {}: {}", set, e))
}
