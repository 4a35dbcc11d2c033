//! Core contracts: the seams between probe logic and the external systems it
//! diagnoses (CUDA driver, Unity editor session).

pub mod gpu;
pub mod sim;
