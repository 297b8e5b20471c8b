use log::{debug, error};

use crate::{
    analysis::graph::reconstruct,
    bool2d::{
        shape::shape_from_simples,
        subset::SubSetR2,
    },
    error::{Error, GeometryError},
    jordan::JordanCurve,
    math::{angle::Angle, tol::POINT_EPS},
    r2::R2,
};

impl SubSetR2 {
    /// Resolves a lazy expression over shapes into a single shape (or the empty or whole
    /// plane): cuts every bounding curve where it meets the others, keeps the arcs the result
    /// runs along, and stitches them into curves.
    ///
    /// Each resulting curve keeps its boundary unless the set excludes every arc of it, as with
    /// holes cut by a complement.
    ///
    /// Non-lazy sets, and expressions with point or curve operands, come back simplified but
    /// otherwise unchanged.
    pub fn clean(&self) -> Result<SubSetR2, Error> {
        let simplified = self.simplify();
        if !simplified.is_lazy() {
            return Ok(simplified);
        }
        if simplified.has_null_leaves() {
            debug!("not reconstructing {}: point or curve operands", simplified);
            return Ok(simplified);
        }
        let mut curves: Vec<JordanCurve> = vec![];
        for jordan in simplified.jordans() {
            if jordan.area().abs() <= POINT_EPS {
                return Err(GeometryError::degenerate(format!("{} encloses no area", jordan)).into());
            }
            let reversed = jordan.reversed();
            if curves.iter().any(|c| c == jordan || *c == reversed) {
                continue;
            }
            curves.push(jordan.clone());
        }
        let simples = reconstruct(&simplified, &curves)?;
        if simples.is_empty() {
            let density = simplified.density(&R2::at_infinity(Angle::ZERO));
            return Ok(if density.is_one() { SubSetR2::Whole } else { SubSetR2::Empty });
        }
        let result = shape_from_simples(simples);
        if let SubSetR2::Shape(shape) = &result {
            if let Err(e) = shape.verify() {
                error!("cleaning {} produced an invalid shape: {}", simplified, e);
            }
        }
        debug!("cleaned {} to {}", simplified, result);
        Ok(result)
    }
}
