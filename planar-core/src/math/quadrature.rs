//! Gauss–Legendre quadrature.

const NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683_1,
    0.,
    0.538_469_310_105_683_1,
    0.906_179_845_938_664,
];
const WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189_1,
    0.478_628_670_499_366_5,
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
];

/// 5-point rule over `[a, b]`; exact for polynomials up to degree 9.
pub fn integrate<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> f64 {
    let half = (b - a) / 2.;
    let mid = (a + b) / 2.;
    NODES.iter().zip(WEIGHTS.iter()).map(|(x, w)| w * f(mid + half * x)).sum::<f64>() * half
}

/// Bisects until both halves agree with the whole to within `tol`.
pub fn integrate_adaptive<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, tol: f64) -> f64 {
    adaptive(f, a, b, tol, integrate(f, a, b), 0)
}

fn adaptive<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, tol: f64, whole: f64, depth: usize) -> f64 {
    let m = (a + b) / 2.;
    let left = integrate(f, a, m);
    let right = integrate(f, m, b);
    if depth >= 24 || (left + right - whole).abs() <= tol {
        left + right
    } else {
        adaptive(f, a, m, tol / 2., left, depth + 1) + adaptive(f, m, b, tol / 2., right, depth + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn polynomial_exact() {
        assert_relative_eq!(integrate(|t| t.powi(5) - 2. * t, 0., 2.), 64. / 6. - 4., epsilon = 1e-12);
    }

    #[test]
    fn adaptive_converges() {
        assert_relative_eq!(integrate_adaptive(&f64::sin, 0., std::f64::consts::PI, 1e-12), 2., epsilon = 1e-10);
        assert_relative_eq!(integrate_adaptive(&f64::sqrt, 0., 1., 1e-10), 2. / 3., epsilon = 1e-7);
    }
}
