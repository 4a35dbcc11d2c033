//! Unity editor session: the in-tree ML-Agents communicator client.
//!
//! The trainer side hosts the rendezvous service and the editor dials in, so
//! "connecting to Unity" means claiming the port and waiting for the editor's
//! first `Exchange`. The conversation after that is strictly request/reply:
//! the editor reports state, the probe answers with a command and actions.

pub mod proto;
pub mod rpc;

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::sim::{SimConnector, Simulation};
use crate::domain::{
    ActionSpec, ActionTuple, BehaviorSpec, DecisionSteps, EnvError, Observation, ObservationSpec,
    TerminalSteps,
};
use crate::infra::config::ProbeSettings;
use proto::observation_proto::ObservationData;
use rpc::RpcCommunicator;

/// ML-Agents communicator API version this client speaks. Editors must match
/// on the major component.
pub const COMMUNICATION_API_VERSION: &str = "1.5.0";

/// Builds one editor session per probe run.
pub struct UnityEditorConnector {
    settings: ProbeSettings,
}

impl UnityEditorConnector {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SimConnector for UnityEditorConnector {
    fn preflight(&self) -> Result<(), EnvError> {
        if self.settings.timeout.is_zero() {
            return Err(EnvError::Setup(
                "wait timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    async fn connect(&self) -> Result<Box<dyn Simulation>, EnvError> {
        let pending = PendingSession::bind(&self.settings).await?;
        let session = pending.attach().await?;
        Ok(Box::new(session))
    }
}

/// A claimed rendezvous port that no editor has attached to yet. Split from
/// [`UnityEditorSession`] so callers can learn the bound address before the
/// wait begins.
pub struct PendingSession {
    rpc: RpcCommunicator,
    settings: ProbeSettings,
}

impl PendingSession {
    pub async fn bind(settings: &ProbeSettings) -> Result<Self, EnvError> {
        let rpc = RpcCommunicator::bind(settings.port).await?;
        Ok(Self {
            rpc,
            settings: settings.clone(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.rpc.local_addr()
    }

    /// Wait for the editor and complete the initialization handshake.
    pub async fn attach(mut self) -> Result<UnityEditorSession, EnvError> {
        // The editor opens the conversation with its academy description.
        let first = self.rpc.recv(self.settings.timeout).await?;
        let init = first
            .unity_output
            .and_then(|o| o.rl_initialization_output)
            .ok_or_else(|| {
                EnvError::Rpc("editor handshake carried no initialization output".into())
            })?;
        check_communication_version(&init.communication_version)?;
        tracing::debug!(
            academy = %init.name,
            package = %init.package_version,
            "editor attached"
        );

        let mut behavior_specs = BTreeMap::new();
        merge_brain_parameters(&mut behavior_specs, &init.brain_parameters);

        self.rpc.send(handshake_reply(&self.settings)).await?;
        // The editor acknowledges with its first state exchange.
        let ack = self.rpc.recv(self.settings.timeout).await?;

        let mut session = UnityEditorSession {
            rpc: Some(self.rpc),
            timeout: self.settings.timeout,
            behavior_specs,
            last_output: None,
            pending_actions: BTreeMap::new(),
        };
        session.absorb_output(ack.unity_output);
        Ok(session)
    }
}

/// A live editor session implementing the base-env surface the probe drives.
#[derive(Debug)]
pub struct UnityEditorSession {
    rpc: Option<RpcCommunicator>,
    timeout: Duration,
    behavior_specs: BTreeMap<String, BehaviorSpec>,
    last_output: Option<proto::UnityRlOutputProto>,
    pending_actions: BTreeMap<String, ActionTuple>,
}

impl UnityEditorSession {
    /// Send one input and absorb the editor's next state message.
    async fn exchange(&mut self, input: proto::UnityInputProto) -> Result<(), EnvError> {
        let rpc = self
            .rpc
            .as_mut()
            .ok_or_else(|| EnvError::Rpc("session already closed".into()))?;
        rpc.send(proto::UnityMessageProto {
            header: Some(ok_header()),
            unity_output: None,
            unity_input: Some(input),
        })
        .await?;
        let timeout = self.timeout;
        let reply = rpc.recv(timeout).await?;
        self.absorb_output(reply.unity_output);
        Ok(())
    }

    /// Fold one editor output into the session: newly registered behaviors
    /// and the latest per-agent state.
    fn absorb_output(&mut self, output: Option<proto::UnityOutputProto>) {
        let Some(output) = output else { return };
        if let Some(init) = &output.rl_initialization_output {
            merge_brain_parameters(&mut self.behavior_specs, &init.brain_parameters);
        }
        if let Some(rl_output) = output.rl_output {
            for (behavior, infos) in &rl_output.agent_infos {
                if let Some(spec) = self.behavior_specs.get_mut(behavior) {
                    refresh_observation_specs(spec, &infos.value);
                }
            }
            self.last_output = Some(rl_output);
        }
    }
}

#[async_trait]
impl Simulation for UnityEditorSession {
    fn behavior_specs(&self) -> &BTreeMap<String, BehaviorSpec> {
        &self.behavior_specs
    }

    async fn reset(&mut self) -> Result<(), EnvError> {
        self.exchange(command_input(proto::CommandProto::Reset, HashMap::new()))
            .await
    }

    async fn get_steps(
        &mut self,
        behavior_name: &str,
    ) -> Result<(DecisionSteps, TerminalSteps), EnvError> {
        let infos = self
            .last_output
            .as_ref()
            .and_then(|o| o.agent_infos.get(behavior_name))
            .map(|list| list.value.clone())
            .unwrap_or_default();
        Ok(split_steps(&infos))
    }

    fn set_actions(&mut self, behavior_name: &str, actions: ActionTuple) -> Result<(), EnvError> {
        let spec = self.behavior_specs.get(behavior_name).ok_or_else(|| {
            EnvError::Other(format!("unknown behavior \"{behavior_name}\""))
        })?;
        let want = spec.action_spec.continuous_size as usize;
        for row in actions.continuous() {
            if row.len() != want {
                return Err(EnvError::Other(format!(
                    "behavior \"{behavior_name}\" takes {want} continuous actions, got {}",
                    row.len()
                )));
            }
        }
        self.pending_actions.insert(behavior_name.to_string(), actions);
        Ok(())
    }

    async fn step(&mut self) -> Result<(), EnvError> {
        let mut agent_actions = HashMap::new();
        for (behavior, tuple) in std::mem::take(&mut self.pending_actions) {
            agent_actions.insert(behavior, to_action_list(&tuple));
        }
        self.exchange(command_input(proto::CommandProto::Step, agent_actions))
            .await
    }

    async fn close(&mut self) -> Result<(), EnvError> {
        if let Some(rpc) = self.rpc.take() {
            rpc.shutdown().await;
        }
        Ok(())
    }
}

fn ok_header() -> proto::HeaderProto {
    proto::HeaderProto {
        status: 200,
        message: String::new(),
    }
}

fn command_input(
    command: proto::CommandProto,
    agent_actions: HashMap<String, proto::ListAgentActionProto>,
) -> proto::UnityInputProto {
    proto::UnityInputProto {
        rl_input: Some(proto::UnityRlInputProto {
            agent_actions,
            command: command as i32,
            // No side channels: the probe drives the bare conversation.
            side_channel: Vec::new(),
        }),
        rl_initialization_input: None,
    }
}

fn handshake_reply(settings: &ProbeSettings) -> proto::UnityMessageProto {
    proto::UnityMessageProto {
        header: Some(ok_header()),
        unity_output: None,
        unity_input: Some(proto::UnityInputProto {
            rl_input: None,
            rl_initialization_input: Some(proto::UnityRlInitializationInputProto {
                seed: settings.seed,
                communication_version: COMMUNICATION_API_VERSION.into(),
                package_version: env!("CARGO_PKG_VERSION").into(),
                capabilities: Some(proto::UnityRlCapabilitiesProto {
                    base_rl_capabilities: true,
                    hybrid_actions: true,
                    ..Default::default()
                }),
                num_areas: 1,
            }),
        }),
    }
}

fn to_action_list(tuple: &ActionTuple) -> proto::ListAgentActionProto {
    let value = (0..tuple.rows())
        .map(|row| proto::AgentActionProto {
            continuous_actions: tuple.continuous().get(row).cloned().unwrap_or_default(),
            discrete_actions: tuple.discrete().get(row).cloned().unwrap_or_default(),
        })
        .collect();
    proto::ListAgentActionProto { value }
}

fn check_communication_version(editor: &str) -> Result<(), EnvError> {
    let major = |version: &str| version.split('.').next().unwrap_or("").to_owned();
    if major(editor) == major(COMMUNICATION_API_VERSION) {
        Ok(())
    } else {
        Err(EnvError::Incompatible {
            editor: editor.to_owned(),
            probe: COMMUNICATION_API_VERSION.to_owned(),
        })
    }
}

fn merge_brain_parameters(
    specs: &mut BTreeMap<String, BehaviorSpec>,
    params: &[proto::BrainParametersProto],
) {
    for bp in params {
        let entry = specs.entry(bp.brain_name.clone()).or_default();
        if let Some(action) = &bp.action_spec {
            entry.action_spec = ActionSpec {
                continuous_size: action.num_continuous_actions,
                discrete_branches: action.discrete_branch_sizes.clone(),
            };
        }
    }
}

/// Observation layouts are not part of the handshake; they come from the
/// first agent that reports for the behavior.
fn refresh_observation_specs(spec: &mut BehaviorSpec, infos: &[proto::AgentInfoProto]) {
    if !spec.observation_specs.is_empty() {
        return;
    }
    let Some(first) = infos.first() else { return };
    spec.observation_specs = first
        .observations
        .iter()
        .enumerate()
        .map(|(index, obs)| ObservationSpec {
            name: if obs.name.is_empty() {
                format!("observation_{index}")
            } else {
                obs.name.clone()
            },
            shape: obs.shape.clone(),
        })
        .collect();
}

fn split_steps(infos: &[proto::AgentInfoProto]) -> (DecisionSteps, TerminalSteps) {
    let (terminal, decision): (Vec<_>, Vec<_>) = infos.iter().partition(|info| info.done);

    let decision_steps = DecisionSteps {
        agent_ids: decision.iter().map(|i| i.id).collect(),
        rewards: decision.iter().map(|i| i.reward).collect(),
        obs: batch_observations(&decision),
    };
    let terminal_steps = TerminalSteps {
        agent_ids: terminal.iter().map(|i| i.id).collect(),
        rewards: terminal.iter().map(|i| i.reward).collect(),
        interrupted: terminal.iter().map(|i| i.max_step_reached).collect(),
        obs: batch_observations(&terminal),
    };
    (decision_steps, terminal_steps)
}

fn batch_observations(agents: &[&proto::AgentInfoProto]) -> Vec<Observation> {
    let Some(first) = agents.first() else {
        return Vec::new();
    };
    (0..first.observations.len())
        .map(|index| {
            let mut shape = vec![agents.len() as i64];
            shape.extend(first.observations[index].shape.iter().map(|&d| i64::from(d)));
            let mut data = Vec::new();
            for agent in agents {
                if let Some(obs) = agent.observations.get(index) {
                    // Compressed observations keep their shape but carry no
                    // float payload the probe can read.
                    if let Some(ObservationData::FloatData(floats)) = &obs.observation_data {
                        data.extend_from_slice(&floats.data);
                    }
                }
            }
            Observation { shape, data }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_info(id: i32, done: bool, obs: Vec<f32>) -> proto::AgentInfoProto {
        proto::AgentInfoProto {
            reward: 0.0,
            done,
            max_step_reached: false,
            id,
            action_mask: Vec::new(),
            observations: vec![proto::ObservationProto {
                shape: vec![obs.len() as i32],
                compression_type: proto::CompressionTypeProto::None as i32,
                name: String::new(),
                observation_data: Some(ObservationData::FloatData(proto::FloatDataProto {
                    data: obs,
                })),
            }],
            group_id: 0,
            group_reward: 0.0,
        }
    }

    fn session_with_behavior(name: &str, continuous: i32) -> UnityEditorSession {
        let mut behavior_specs = BTreeMap::new();
        behavior_specs.insert(
            name.to_string(),
            BehaviorSpec {
                observation_specs: Vec::new(),
                action_spec: ActionSpec::continuous(continuous),
            },
        );
        UnityEditorSession {
            rpc: None,
            timeout: Duration::from_secs(1),
            behavior_specs,
            last_output: None,
            pending_actions: BTreeMap::new(),
        }
    }

    #[test]
    fn matching_major_versions_are_compatible() {
        assert!(check_communication_version("1.5.0").is_ok());
        assert!(check_communication_version("1.0.0").is_ok());
    }

    #[test]
    fn mismatched_major_version_is_rejected() {
        let err = check_communication_version("0.9.0").unwrap_err();
        assert!(matches!(err, EnvError::Incompatible { .. }));
        assert!(check_communication_version("").is_err());
    }

    #[test]
    fn brain_parameters_register_behaviors() {
        let mut specs = BTreeMap::new();
        merge_brain_parameters(
            &mut specs,
            &[proto::BrainParametersProto {
                brain_name: "RoverAgent".into(),
                is_training: true,
                action_spec: Some(proto::ActionSpecProto {
                    num_continuous_actions: 2,
                    num_discrete_actions: 0,
                    discrete_branch_sizes: Vec::new(),
                    action_descriptions: Vec::new(),
                }),
            }],
        );
        assert_eq!(specs["RoverAgent"].action_spec.continuous_size, 2);
        assert!(specs["RoverAgent"].action_spec.discrete_branches.is_empty());
    }

    #[test]
    fn split_steps_partitions_on_done_flag() {
        let infos = vec![
            agent_info(1, false, vec![0.1; 8]),
            agent_info(2, true, vec![0.2; 8]),
            agent_info(3, false, vec![0.3; 8]),
        ];
        let (decision, terminal) = split_steps(&infos);
        assert_eq!(decision.agent_ids, vec![1, 3]);
        assert_eq!(terminal.agent_ids, vec![2]);
        // Leading dimension is the agent count.
        assert_eq!(decision.obs[0].shape, vec![2, 8]);
        assert_eq!(decision.obs[0].data.len(), 16);
        assert_eq!(terminal.obs[0].shape, vec![1, 8]);
    }

    #[test]
    fn observation_specs_fill_from_first_agent() {
        let mut spec = BehaviorSpec::default();
        refresh_observation_specs(&mut spec, &[agent_info(1, false, vec![0.0; 8])]);
        assert_eq!(spec.observation_specs.len(), 1);
        assert_eq!(spec.observation_specs[0].shape, vec![8]);
        assert_eq!(spec.observation_specs[0].name, "observation_0");
    }

    #[test]
    fn set_actions_rejects_wrong_width() {
        let mut session = session_with_behavior("RoverAgent", 2);
        let mut actions = ActionTuple::new();
        actions.add_continuous(vec![0.5, 0.8, 0.1]);
        let err = session.set_actions("RoverAgent", actions).unwrap_err();
        assert!(err.to_string().contains("2 continuous actions"));
    }

    #[test]
    fn set_actions_requires_a_known_behavior() {
        let mut session = session_with_behavior("RoverAgent", 2);
        let mut actions = ActionTuple::new();
        actions.add_continuous(vec![0.5, 0.8]);
        assert!(session.set_actions("Ghost", actions).is_err());
    }

    #[test]
    fn step_input_carries_the_pending_actions() {
        let mut tuple = ActionTuple::new();
        tuple.add_continuous(vec![0.5, 0.8]);
        let list = to_action_list(&tuple);
        assert_eq!(list.value.len(), 1);
        assert_eq!(list.value[0].continuous_actions, vec![0.5, 0.8]);
        assert!(list.value[0].discrete_actions.is_empty());
    }
}
