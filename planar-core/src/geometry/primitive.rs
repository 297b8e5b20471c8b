use crate::{
    bool2d::subset::SubSetR2,
    error::{Error, ShapeError},
    jordan::JordanCurve,
    math::angle::Angle,
    r2::R2,
    segment::Segment,
    transform::Transform,
};

fn positive(what: &'static str, value: f64) -> Result<f64, ShapeError> {
    if value > 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ShapeError::NonPositive { what, value })
    }
}

/// Closed polyline through `vertices`; counter-clockwise order bounds the interior.
pub fn polygon(vertices: &[R2<f64>]) -> Result<SubSetR2, Error> {
    Ok(JordanCurve::polygon(vertices)?.into())
}

/// Right isosceles triangle with its right angle at `corner` and legs along the axes.
pub fn triangle(side: f64, corner: impl Into<R2<f64>>) -> Result<SubSetR2, Error> {
    let side = positive("side", side)?;
    let c = corner.into();
    polygon(&[c, c + R2 { x: side, y: 0. }, c + R2 { x: 0., y: side }])
}

/// Axis-aligned square centered on `center`.
pub fn square(side: f64, center: impl Into<R2<f64>>) -> Result<SubSetR2, Error> {
    let h = positive("side", side)? / 2.;
    let c = center.into();
    polygon(&[
        c + R2 { x: h, y: h },
        c + R2 { x: -h, y: h },
        c + R2 { x: -h, y: -h },
        c + R2 { x: h, y: -h },
    ])
}

/// `nsides` vertices on the circle of `radius` about `center`, the first on the positive
/// x-axis.
pub fn regular_polygon(nsides: usize, radius: f64, center: impl Into<R2<f64>>) -> Result<SubSetR2, Error> {
    if nsides < 3 {
        return Err(ShapeError::TooFewSides(nsides).into());
    }
    let radius = positive("radius", radius)?;
    let c = center.into();
    let vertices: Vec<_> = (0..nsides)
        .map(|k| c + R2::polar(radius, Angle::turns(k as f64 / nsides as f64)))
        .collect();
    polygon(&vertices)
}

pub fn circle(radius: f64, center: impl Into<R2<f64>>) -> Result<SubSetR2, Error> {
    circle_with(radius, center, 16)
}

/// Circle approximated by `ndivangle` quadratic arcs, each tangent to the true circle at its
/// endpoints.
pub fn circle_with(radius: f64, center: impl Into<R2<f64>>, ndivangle: usize) -> Result<SubSetR2, Error> {
    let radius = positive("radius", radius)?;
    if ndivangle < 4 {
        return Err(ShapeError::TooFewSides(ndivangle).into());
    }
    let c = center.into();
    let step = 1. / ndivangle as f64;
    let tip = R2 { x: radius, y: radius * Angle::turns(step / 2.).to_radians().tan() };
    let segments = (0..ndivangle)
        .map(|k| {
            let from = Angle::turns(k as f64 * step);
            // Last arc ends exactly where the first begins.
            let to = Angle::turns(if k + 1 == ndivangle { 0. } else { (k + 1) as f64 * step });
            Segment::quadratic(
                c + R2::polar(radius, from),
                c + Transform::Rotate(from).apply(&tip),
                c + R2::polar(radius, to),
            )
        })
        .collect();
    Ok(JordanCurve::new(segments)?.into())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::{bool2d::shape::Shape, error::GeometryError};
    use test_log::test;

    fn r2(x: f64, y: f64) -> R2<f64> {
        R2 { x, y }
    }

    fn jordan(set: &SubSetR2) -> &JordanCurve {
        match set {
            SubSetR2::Shape(Shape::Simple(s)) => &s.jordan,
            _ => panic!("expected simple shape, got {}", set),
        }
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(
            square(0., (0., 0.)).unwrap_err(),
            Error::Shape(ShapeError::NonPositive { what: "side", value: 0. })
        );
        assert!(triangle(-1., (0., 0.)).is_err());
        assert_eq!(regular_polygon(2, 1., (0., 0.)).unwrap_err(), Error::Shape(ShapeError::TooFewSides(2)));
        assert!(regular_polygon(5, f64::NAN, (0., 0.)).is_err());
        assert!(circle(0., (0., 0.)).is_err());
        assert_eq!(circle_with(1., (0., 0.), 3).unwrap_err(), Error::Shape(ShapeError::TooFewSides(3)));
        assert_eq!(polygon(&[r2(0., 0.), r2(1., 1.)]).unwrap_err(), Error::Shape(ShapeError::TooFewVertices(2)));
        let bowtie = polygon(&[r2(0., 0.), r2(2., 2.), r2(2., 0.), r2(0., 2.)]);
        assert!(matches!(bowtie, Err(Error::Geometry(GeometryError::NotSimple { .. }))), "{:?}", bowtie);
    }

    #[test]
    fn vertices() {
        let sq = square(2., (1., 1.)).unwrap();
        assert_eq!(jordan(&sq).vertices(), vec![r2(2., 2.), r2(0., 2.), r2(0., 0.), r2(2., 0.)]);
        let tri = triangle(3., (1., 0.)).unwrap();
        assert_eq!(jordan(&tri).vertices(), vec![r2(1., 0.), r2(4., 0.), r2(1., 3.)]);
        let diamond = regular_polygon(4, 2., (1., 0.)).unwrap();
        assert_eq!(jordan(&diamond).vertices(), vec![r2(3., 0.), r2(1., 2.), r2(-1., 0.), r2(1., -2.)]);
    }

    #[test]
    fn areas() {
        assert_relative_eq!(square(3., (5., -5.)).unwrap().area().unwrap(), 9.);
        assert_relative_eq!(triangle(2., (0., 0.)).unwrap().area().unwrap(), 2.);
        assert_relative_eq!(regular_polygon(6, 1., (0., 0.)).unwrap().area().unwrap(), 1.5 * 3f64.sqrt(), epsilon = 1e-12);
        let clockwise = polygon(&[r2(0., 0.), r2(0., 1.), r2(1., 1.), r2(1., 0.)]).unwrap();
        assert_relative_eq!(clockwise.area().unwrap(), -1.);
        for r in [0.5, 1., 3.] {
            let c = circle(r, (1., 2.)).unwrap();
            assert_relative_eq!(c.area().unwrap(), PI * r * r, max_relative = 1e-3);
        }
        let coarse = circle_with(1., (0., 0.), 4).unwrap().area().unwrap();
        let fine = circle_with(1., (0., 0.), 64).unwrap().area().unwrap();
        assert!((fine - PI).abs() < (coarse - PI).abs());
    }

    #[test]
    fn circle_arcs() {
        let c = circle_with(2., (1., 1.), 8).unwrap();
        let jordan = jordan(&c);
        assert_eq!(jordan.segments().len(), 8);
        for segment in jordan.segments() {
            assert_eq!(segment.degree(), 2);
            assert_relative_eq!((segment.eval(0.5) - r2(1., 1.)).norm(), 2., max_relative = 2e-2);
        }
        assert_relative_eq!(jordan.segments()[0].start(), r2(3., 1.), epsilon = 1e-12);
        assert_eq!(jordan.segments()[7].end(), jordan.segments()[0].start());
    }
}
