//! Domain types mirroring the ML-Agents base-env surface: behavior and
//! action/observation specifications, per-tick step data, and the probe
//! error model.

pub mod error;
pub mod spec;
pub mod steps;

pub use error::{EnvError, FailureKind};
pub use spec::{ActionSpec, ActionTuple, BehaviorSpec, ObservationSpec};
pub use steps::{DecisionSteps, Observation, TerminalSteps};
