/// One observation stream batched across every agent in a step. The leading
/// dimension of `shape` is the agent count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

/// Agents that are waiting for an action this tick.
#[derive(Debug, Clone, Default)]
pub struct DecisionSteps {
    pub agent_ids: Vec<i32>,
    pub rewards: Vec<f32>,
    pub obs: Vec<Observation>,
}

impl DecisionSteps {
    pub fn len(&self) -> usize {
        self.agent_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agent_ids.is_empty()
    }
}

/// Agents whose episode ended this tick.
#[derive(Debug, Clone, Default)]
pub struct TerminalSteps {
    pub agent_ids: Vec<i32>,
    pub rewards: Vec<f32>,
    pub interrupted: Vec<bool>,
    pub obs: Vec<Observation>,
}

impl TerminalSteps {
    pub fn len(&self) -> usize {
        self.agent_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agent_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_steps_report_zero_agents() {
        let decision = DecisionSteps::default();
        assert_eq!(decision.len(), 0);
        assert!(decision.is_empty());
        assert!(TerminalSteps::default().is_empty());
    }
}
