pub mod analyzer;
mod builtins;
pub mod error;

#[cfg(test)]
mod analyzer_test;

pub(crate) use analyzer::analyze;
pub use error::CheckError;
