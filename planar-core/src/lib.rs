#![allow(mixed_script_confusables)]

#[cfg_attr(not(test), allow(unused_imports))]
#[macro_use]
extern crate approx;

pub mod analysis;
pub mod bool1d;
pub mod bool2d;
pub mod error;
pub mod geometry;
pub mod math;

pub use geometry::jordan;
pub use geometry::piecewise;
pub use geometry::primitive;
pub use geometry::r2;
pub use geometry::segment;
pub use geometry::transform;

pub use analysis::density;
pub use analysis::intersect;

pub use bool1d::SubSetR1;
pub use bool2d::shape::{ConnectedShape, DisjointShape, Shape, SimpleShape};
pub use bool2d::subset::{SubSetR2, EMPTY, WHOLE};
pub use error::Error;
pub use jordan::JordanCurve;
pub use math::angle::Angle;
pub use piecewise::PiecewiseCurve;
pub use r2::R2;
pub use segment::Segment;

/// Parse a log level string into LevelFilter.
pub fn parse_log_level(level: Option<&str>) -> log::LevelFilter {
    match level {
        Some("error") => log::LevelFilter::Error,
        Some("warn") => log::LevelFilter::Warn,
        Some("info") | Some("") | None => log::LevelFilter::Info,
        Some("debug") => log::LevelFilter::Debug,
        Some("trace") => log::LevelFilter::Trace,
        Some("off") => log::LevelFilter::Off,
        Some(level) => {
            log::warn!("invalid log level {:?}, defaulting to info", level);
            log::LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level(None), log::LevelFilter::Info);
        assert_eq!(parse_log_level(Some("debug")), log::LevelFilter::Debug);
        assert_eq!(parse_log_level(Some("off")), log::LevelFilter::Off);
        assert_eq!(parse_log_level(Some("loud")), log::LevelFilter::Info);
    }
}
