use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{ActionTuple, BehaviorSpec, DecisionSteps, EnvError, TerminalSteps};

/// A live simulation session. Mirrors the slice of the ML-Agents base-env
/// surface the probe drives: spec lookup, reset, step split, action
/// submission, one step, close.
#[async_trait]
pub trait Simulation: Send + std::fmt::Debug {
    /// Behaviors the editor has registered so far, keyed by name.
    fn behavior_specs(&self) -> &BTreeMap<String, BehaviorSpec>;

    async fn reset(&mut self) -> Result<(), EnvError>;

    /// Split the current tick into decision-pending and terminal agents for
    /// one behavior.
    async fn get_steps(
        &mut self,
        behavior_name: &str,
    ) -> Result<(DecisionSteps, TerminalSteps), EnvError>;

    /// Queue actions for the next step. Rejected when the row width does not
    /// match the behavior's action spec.
    fn set_actions(&mut self, behavior_name: &str, actions: ActionTuple) -> Result<(), EnvError>;

    async fn step(&mut self) -> Result<(), EnvError>;

    async fn close(&mut self) -> Result<(), EnvError>;
}

/// Builds simulation sessions. Split from [`Simulation`] so the probe can be
/// exercised against a mocked environment, and so setup failures are
/// distinguishable from connection failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimConnector: Send + Sync {
    /// Validate everything that must hold before a connection is attempted.
    /// A `Setup` error here means `connect` is never called.
    fn preflight(&self) -> Result<(), EnvError>;

    async fn connect(&self) -> Result<Box<dyn Simulation>, EnvError>;
}

#[cfg(test)]
mockall::mock! {
    #[derive(Debug)]
    pub Sim {}

    #[async_trait]
    impl Simulation for Sim {
        fn behavior_specs(&self) -> &BTreeMap<String, BehaviorSpec>;
        async fn reset(&mut self) -> Result<(), EnvError>;
        async fn get_steps(
            &mut self,
            behavior_name: &str,
        ) -> Result<(DecisionSteps, TerminalSteps), EnvError>;
        fn set_actions(&mut self, behavior_name: &str, actions: ActionTuple) -> Result<(), EnvError>;
        async fn step(&mut self) -> Result<(), EnvError>;
        async fn close(&mut self) -> Result<(), EnvError>;
    }
}
