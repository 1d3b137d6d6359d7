pub mod types;

pub use types::{Severity, ValidationViolation};
