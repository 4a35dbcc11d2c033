//! The two diagnostics this crate ships: the CUDA capability report and the
//! one-shot Unity connectivity probe.

pub mod connection;
pub mod cuda;
