//! Command-line surfaces: interactive switcher, readiness check, doctor.

pub mod doctor;
pub mod prompts;
pub mod switch;
