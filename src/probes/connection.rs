use std::time::Instant;

use serde::Serialize;

use crate::core::sim::SimConnector;
use crate::domain::{ActionSpec, ActionTuple, EnvError, FailureKind, ObservationSpec};
use crate::infra::config::ProbeSettings;
use crate::infra::logging;

/// What one successful probe run learned about the environment.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeSummary {
    pub behavior_name: String,
    pub observation_specs: Vec<ObservationSpec>,
    pub action_spec: ActionSpec,
    pub pending_agents: usize,
    pub first_observation_shape: Option<Vec<i64>>,
    pub action_sent: bool,
}

/// One-shot connectivity probe: connect, read the behavior spec, reset, send
/// a single test action, step once, close. No stage is retried; the first
/// failure ends the run.
pub struct ConnectionProbe {
    settings: ProbeSettings,
}

impl ConnectionProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    pub async fn run(&self, connector: &dyn SimConnector) -> Result<ProbeSummary, EnvError> {
        connector.preflight()?;

        println!(
            "\nAttempting to connect to the Unity editor (port {})...",
            self.settings.port
        );
        println!(
            "Waiting for the editor to attach (this may take up to {} seconds)...",
            self.settings.timeout.as_secs()
        );

        let started = Instant::now();
        let mut env = connector.connect().await?;
        logging::log_metric(
            "connection",
            "connect_latency_ms",
            started.elapsed().as_millis() as f64,
        );

        println!("\n✓ Successfully connected to the Unity environment!");
        let behavior_names: Vec<String> = env.behavior_specs().keys().cloned().collect();
        println!("✓ Behavior specs: {behavior_names:?}");

        let behavior_name = behavior_names
            .first()
            .cloned()
            .ok_or_else(|| EnvError::Other("the editor registered no behaviors".into()))?;
        let spec = env.behavior_specs()[&behavior_name].clone();

        println!("\nBehavior Name: {behavior_name}");
        println!("Observation Space: {}", describe_observations(&spec.observation_specs));
        println!(
            "Action Space: Continuous={}, Discrete={}",
            spec.action_spec.continuous_size,
            spec.action_spec.discrete_size()
        );

        env.reset().await?;
        let (decision_steps, _terminal_steps) = env.get_steps(&behavior_name).await?;

        let mut summary = ProbeSummary {
            behavior_name: behavior_name.clone(),
            observation_specs: spec.observation_specs,
            action_spec: spec.action_spec,
            pending_agents: decision_steps.len(),
            first_observation_shape: None,
            action_sent: false,
        };

        if decision_steps.is_empty() {
            println!("\n⚠ Warning: no agents found in the environment!");
            println!("Make sure the agent is active in the scene.");
        } else {
            println!("\n✓ Environment reset successful!");
            println!("✓ Number of agents: {}", decision_steps.len());
            if let Some(first_obs) = decision_steps.obs.first() {
                println!("✓ Observation shape: {:?}", first_obs.shape);
                summary.first_observation_shape = Some(first_obs.shape.clone());
            }

            println!(
                "\nSending test action (steer={}, throttle={})...",
                self.settings.steer, self.settings.throttle
            );
            let mut actions = ActionTuple::new();
            actions.add_continuous(vec![self.settings.steer, self.settings.throttle]);
            env.set_actions(&behavior_name, actions)?;
            env.step().await?;
            println!("✓ Action sent successfully!");
            summary.action_sent = true;
        }

        env.close().await?;

        let divider = "=".repeat(60);
        println!("\n{divider}");
        println!("Connection test completed successfully!");
        println!("{divider}");
        Ok(summary)
    }
}

fn describe_observations(specs: &[ObservationSpec]) -> String {
    if specs.is_empty() {
        return "(none reported yet)".to_string();
    }
    specs
        .iter()
        .map(|spec| format!("{}{:?}", spec.name, spec.shape))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Headline printed above the remediation checklist for a failed run.
pub fn failure_headline(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Setup => "⚠ SETUP ERROR - the probe could not be prepared",
        FailureKind::Timeout => "⚠ TIMEOUT ERROR - Unity didn't respond in time",
        FailureKind::Address => "⚠ PORT/CONNECTION ERROR",
        FailureKind::Unknown => "Troubleshooting:",
    }
}

/// Checklist matching the failure category.
pub fn remediation(kind: FailureKind) -> &'static [&'static str] {
    match kind {
        FailureKind::Setup => &[
            "Check the probe configuration (port and wait timeout)",
            "Make sure the ML-Agents environment is installed next to the project",
            "Re-run from the project root so the install can be found",
        ],
        FailureKind::Timeout => &[
            "Unity is in Play mode (not paused)",
            "The Unity Console shows 'Waiting for connection...' or 'Connected new brain'",
            "An ML-Agents Academy component exists in the scene",
            "No errors in the Unity Console",
            "The agent GameObject is active in the scene",
            "Behavior Parameters > Behavior Type is set to 'Default' (not 'Heuristic Only')",
        ],
        FailureKind::Address => &[
            "The port might be blocked or in use",
            "Try closing other Unity or trainer instances",
            "Check the firewall settings",
        ],
        FailureKind::Unknown => &[
            "Unity is in Play mode (not paused)",
            "Check the Unity Console for errors or connection messages",
            "Verify Behavior Parameters > Behavior Name matches the trainer config",
            "Make sure an ML-Agents Academy component is in the scene",
            "Try stopping Play mode, then starting it again",
            "Restart Unity and try again",
        ],
    }
}

/// Printed after every checklist, whatever the category.
pub const NEXT_STEPS: &[&str] = &[
    "Look at the Unity Console for any error messages",
    "Verify the scene has an ML-Agents Academy GameObject",
    "Make sure the agent is active and has all required components",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sim::{MockSim, MockSimConnector};
    use crate::domain::{BehaviorSpec, DecisionSteps, Observation, TerminalSteps};
    use std::collections::BTreeMap;

    fn rover_specs() -> BTreeMap<String, BehaviorSpec> {
        let mut specs = BTreeMap::new();
        specs.insert(
            "RoverAgent".to_string(),
            BehaviorSpec {
                observation_specs: vec![ObservationSpec {
                    name: "observation_0".into(),
                    shape: vec![8],
                }],
                action_spec: ActionSpec::continuous(2),
            },
        );
        specs
    }

    fn one_pending_agent() -> DecisionSteps {
        DecisionSteps {
            agent_ids: vec![1],
            rewards: vec![0.0],
            obs: vec![Observation {
                shape: vec![1, 8],
                data: vec![0.0; 8],
            }],
        }
    }

    fn connector_returning(sim: MockSim) -> MockSimConnector {
        let mut connector = MockSimConnector::new();
        connector.expect_preflight().returning(|| Ok(()));
        connector
            .expect_connect()
            .times(1)
            .return_once(move || Ok(Box::new(sim)));
        connector
    }

    #[tokio::test]
    async fn happy_path_sends_one_action_and_steps_once() {
        let mut sim = MockSim::new();
        sim.expect_behavior_specs().return_const(rover_specs());
        sim.expect_reset().times(1).returning(|| Ok(()));
        sim.expect_get_steps()
            .times(1)
            .returning(|_| Ok((one_pending_agent(), TerminalSteps::default())));
        sim.expect_set_actions()
            .times(1)
            .withf(|behavior, actions| {
                behavior == "RoverAgent" && actions.continuous() == [vec![0.5, 0.8]]
            })
            .returning(|_, _| Ok(()));
        sim.expect_step().times(1).returning(|| Ok(()));
        sim.expect_close().times(1).returning(|| Ok(()));

        let connector = connector_returning(sim);
        let probe = ConnectionProbe::new(ProbeSettings::default());
        let summary = probe.run(&connector).await.unwrap();

        assert_eq!(summary.behavior_name, "RoverAgent");
        assert_eq!(summary.pending_agents, 1);
        assert_eq!(summary.first_observation_shape, Some(vec![1, 8]));
        assert!(summary.action_sent);
    }

    #[tokio::test]
    async fn zero_pending_agents_skips_the_action_path_but_still_closes() {
        let mut sim = MockSim::new();
        sim.expect_behavior_specs().return_const(rover_specs());
        sim.expect_reset().times(1).returning(|| Ok(()));
        sim.expect_get_steps()
            .times(1)
            .returning(|_| Ok((DecisionSteps::default(), TerminalSteps::default())));
        sim.expect_set_actions().times(0);
        sim.expect_step().times(0);
        sim.expect_close().times(1).returning(|| Ok(()));

        let connector = connector_returning(sim);
        let probe = ConnectionProbe::new(ProbeSettings::default());
        let summary = probe.run(&connector).await.unwrap();

        assert_eq!(summary.pending_agents, 0);
        assert!(!summary.action_sent);
        assert!(summary.first_observation_shape.is_none());
    }

    #[tokio::test]
    async fn setup_failure_never_attempts_a_connection() {
        let mut connector = MockSimConnector::new();
        connector
            .expect_preflight()
            .returning(|| Err(EnvError::Setup("wait timeout must be greater than zero".into())));
        connector.expect_connect().times(0);

        let probe = ConnectionProbe::new(ProbeSettings::default());
        let err = probe.run(&connector).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Setup);
    }

    #[tokio::test]
    async fn connect_timeout_surfaces_the_timeout_kind() {
        let mut connector = MockSimConnector::new();
        connector.expect_preflight().returning(|| Ok(()));
        connector
            .expect_connect()
            .times(1)
            .returning(|| Err(EnvError::Timeout(60)));

        let probe = ConnectionProbe::new(ProbeSettings::default());
        let err = probe.run(&connector).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[tokio::test]
    async fn no_registered_behaviors_is_a_plain_failure() {
        let mut sim = MockSim::new();
        sim.expect_behavior_specs()
            .return_const(BTreeMap::<String, BehaviorSpec>::new());

        let connector = connector_returning(sim);
        let probe = ConnectionProbe::new(ProbeSettings::default());
        let err = probe.run(&connector).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unknown);
        assert!(err.to_string().contains("no behaviors"));
    }

    #[test]
    fn each_failure_kind_selects_its_checklist() {
        assert!(remediation(FailureKind::Timeout)
            .iter()
            .any(|line| line.contains("Play mode")));
        assert!(remediation(FailureKind::Address)
            .iter()
            .any(|line| line.contains("blocked or in use")));
        assert!(remediation(FailureKind::Setup)
            .iter()
            .any(|line| line.contains("configuration")));
        assert!(failure_headline(FailureKind::Timeout).contains("TIMEOUT"));
        assert!(failure_headline(FailureKind::Address).contains("PORT"));
    }
}
