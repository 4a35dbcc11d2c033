//! Diagnostics for Unity ML-Agents training setups.
//!
//! Two probes, both one-shot: a CUDA capability report and a Unity editor
//! connectivity check that drives the environment for exactly one step.

pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod probes;
