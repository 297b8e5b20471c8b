pub mod clean;
pub mod parse;
pub mod shape;
pub mod simplify;
pub mod subset;

#[cfg(test)]
mod tests;
