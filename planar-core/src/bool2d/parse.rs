use std::str::FromStr;

use crate::{bool2d::subset::SubSetR2, error::ShapeError, r2::R2};

fn parse_point(s: &str) -> Result<R2<f64>, ShapeError> {
    let err = || ShapeError::Parse(s.to_string());
    let body = s.trim().strip_prefix('(').and_then(|s| s.strip_suffix(')')).ok_or_else(err)?;
    let (x, y) = body.split_once(',').ok_or_else(err)?;
    let x = x.trim().parse::<f64>().map_err(|_| err())?;
    let y = y.trim().parse::<f64>().map_err(|_| err())?;
    Ok(R2 { x, y })
}

impl FromStr for SubSetR2 {
    type Err = ShapeError;

    /// Parses trivial sets (`EmptyR2` or `{}`, `WholeR2` or `(-inf, inf)`) and finite point
    /// sets (`{(x, y)}`, `{(x1, y1), (x2, y2)}`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "EmptyR2" | "{}" => return Ok(SubSetR2::Empty),
            "WholeR2" | "(-inf, inf)" => return Ok(SubSetR2::Whole),
            _ => {}
        }
        let err = || ShapeError::Parse(s.to_string());
        let body = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')).ok_or_else(err)?;
        let mut points = vec![];
        let mut rest = body.trim();
        while !rest.is_empty() {
            let close = rest.find(')').ok_or_else(err)?;
            let p = parse_point(&rest[..=close])?;
            points.push(SubSetR2::point(p)?);
            rest = rest[close + 1..].trim_start();
            if let Some(after) = rest.strip_prefix(',') {
                rest = after.trim_start();
                if rest.is_empty() {
                    return Err(err());
                }
            } else if !rest.is_empty() {
                return Err(err());
            }
        }
        Ok(SubSetR2::unite(points))
    }
}

impl PartialEq<str> for SubSetR2 {
    /// Text that doesn't parse is simply unequal.
    fn eq(&self, other: &str) -> bool {
        other.parse::<SubSetR2>().map_or(false, |o| o == *self)
    }
}

impl PartialEq<&str> for SubSetR2 {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn trivial() {
        assert!("EmptyR2".parse::<SubSetR2>().unwrap().is_empty());
        assert!("{}".parse::<SubSetR2>().unwrap().is_empty());
        assert!("WholeR2".parse::<SubSetR2>().unwrap().is_whole());
        assert!(" (-inf, inf) ".parse::<SubSetR2>().unwrap().is_whole());
        assert_eq!(SubSetR2::Empty, "EmptyR2");
        assert_eq!(SubSetR2::Whole, "(-inf, inf)");
    }

    #[test]
    fn points() {
        let p = "{(1, 2.5)}".parse::<SubSetR2>().unwrap();
        assert!(p.same(&SubSetR2::from(R2 { x: 1., y: 2.5 })));
        let ps = "{(3, 0), (1, -2)}".parse::<SubSetR2>().unwrap();
        assert_eq!(ps.to_string(), "OR[{(1, -2)}, {(3, 0)}]");
        assert_eq!(ps, "{(1, -2), (3, 0)}");
        assert_eq!(SubSetR2::from(R2 { x: 1., y: 2. }), "{(1, 2)}");
    }

    #[test]
    fn garbage() {
        for s in ["", "(])", "{(1, 2)", "{(1, 2),}", "{(1; 2)}", "{(a, 2)}", "{(1, 2) (3, 4)}", "Polygon[]"] {
            assert!(s.parse::<SubSetR2>().is_err(), "{:?} parsed", s);
            assert_ne!(SubSetR2::Empty, s);
        }
    }
}
