use serde::{Deserialize, Serialize};

/// Shape and name of one observation stream exposed by a behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpec {
    pub name: String,
    pub shape: Vec<i32>,
}

/// Action layout of a behavior: a continuous vector plus zero or more
/// discrete branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub continuous_size: i32,
    pub discrete_branches: Vec<i32>,
}

impl ActionSpec {
    pub fn continuous(size: i32) -> Self {
        Self {
            continuous_size: size,
            discrete_branches: Vec::new(),
        }
    }

    pub fn discrete_size(&self) -> i32 {
        self.discrete_branches.len() as i32
    }
}

/// Everything the editor advertises about a named behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorSpec {
    /// Observation streams, in the order agents report them. Empty until the
    /// first agent data for this behavior arrives.
    pub observation_specs: Vec<ObservationSpec>,
    pub action_spec: ActionSpec,
}

/// One batch of actions, one row per agent awaiting a decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionTuple {
    continuous: Vec<Vec<f32>>,
    discrete: Vec<Vec<i32>>,
}

impl ActionTuple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_continuous(&mut self, row: Vec<f32>) {
        self.continuous.push(row);
    }

    pub fn add_discrete(&mut self, row: Vec<i32>) {
        self.discrete.push(row);
    }

    pub fn continuous(&self) -> &[Vec<f32>] {
        &self.continuous
    }

    pub fn discrete(&self) -> &[Vec<i32>] {
        &self.discrete
    }

    /// Number of agent rows carried by this tuple.
    pub fn rows(&self) -> usize {
        self.continuous.len().max(self.discrete.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_size_counts_branches() {
        let spec = ActionSpec {
            continuous_size: 2,
            discrete_branches: vec![3, 2],
        };
        assert_eq!(spec.discrete_size(), 2);
        assert_eq!(ActionSpec::continuous(2).discrete_size(), 0);
    }

    #[test]
    fn action_tuple_tracks_rows() {
        let mut actions = ActionTuple::new();
        assert_eq!(actions.rows(), 0);
        actions.add_continuous(vec![0.5, 0.8]);
        assert_eq!(actions.rows(), 1);
        assert_eq!(actions.continuous()[0], vec![0.5, 0.8]);
        assert!(actions.discrete().is_empty());
    }
}
