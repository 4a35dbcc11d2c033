//! Concrete backends for the core contracts: the cudarc-backed driver view
//! and the Unity editor communicator.

pub mod cuda;
pub mod unity;
