pub mod angle;
pub mod polynomial;
pub mod quadrature;
pub mod tol;
