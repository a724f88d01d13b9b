//! Configuration validation
//!
//! Checks a run configuration once, before anything is built.

mod error;
mod validator;

#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::validate_config;
