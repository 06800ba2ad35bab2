//! Scholarship eligibility screening and approval-probability prediction.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
