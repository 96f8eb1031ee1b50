//! Verification of pipeline outputs
//!
//! The engine runs each stage [`Checker`] for every date in a journal. Problems
//! are accumulated per checker as [`Finding`]s rather than raised.

pub mod checkers;
pub mod engine;
pub mod fields;
pub mod findings;
pub mod support;

#[cfg(test)]
pub(crate) mod testing;

pub use checkers::default_checkers;
pub use engine::{Checker, Services, VerificationEngine};
pub use fields::{FieldSpec, FieldValidator, FieldViolation};
pub use findings::{ErrorLog, Finding, FindingKind};
