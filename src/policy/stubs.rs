//! Baseline policy implementations.
//!
//! These live behind the same `Policy` trait as any external model and
//! exist so the engine can be exercised end to end: `UniformPolicy` for
//! tests, `LinearPolicy` as a small evolvable baseline for `soldash`.
//! Neither is a serious player.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::SessionRng;

use super::traits::{EncodedState, Experience, Policy, PolicyOutput};

/// Uniform policy: every action equally preferred, value always zero.
#[derive(Clone, Debug)]
pub struct UniformPolicy {
    action_space: usize,
    lineage: String,
}

impl UniformPolicy {
    /// Create a root uniform policy.
    #[must_use]
    pub fn new(action_space: usize) -> Self {
        Self {
            action_space,
            lineage: "root".to_string(),
        }
    }
}

impl Policy for UniformPolicy {
    fn predict(&self, _state: &EncodedState) -> PolicyOutput {
        PolicyOutput {
            action_scores: vec![1.0; self.action_space],
            value: 0.0,
        }
    }

    fn mutate(&self, rng: &mut SessionRng) -> Arc<dyn Policy> {
        let tag = rng.gen_range(0..1000);
        Arc::new(Self {
            action_space: self.action_space,
            lineage: format!("{}/{}", self.lineage, tag),
        })
    }

    fn loss_estimate(&self) -> f64 {
        1.0
    }

    fn lineage(&self) -> String {
        self.lineage.clone()
    }

    fn kind(&self) -> &'static str {
        "uniform"
    }

    fn export_params(&self) -> Vec<u8> {
        Vec::new()
    }
}

/// Serializable parameter block for `LinearPolicy`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearParams {
    /// Row-major weights: one row of `features` weights per action.
    pub weights: Vec<f32>,
    /// Value head weights, one per feature.
    pub value_weights: Vec<f32>,
}

/// A linear scorer over encoded features, evolved by mutation.
///
/// Scores are one dot product per action. Mutation perturbs a random
/// subset of weights; `update` refreshes the loss scalar from episode
/// experience.
#[derive(Clone, Debug)]
pub struct LinearPolicy {
    params: LinearParams,
    features: usize,
    action_space: usize,
    lineage: String,
    loss: f64,
    mutation_rate: f64,
    mutation_strength: f32,
}

impl LinearPolicy {
    /// Create a randomly initialized root policy.
    #[must_use]
    pub fn new_random(rng: &mut SessionRng, features: usize, action_space: usize) -> Self {
        let mut weights = Vec::with_capacity(features * action_space);
        for _ in 0..features * action_space {
            weights.push(rng.gen_f32() - 0.5);
        }
        let value_weights = (0..features).map(|_| rng.gen_f32() - 0.5).collect();

        Self {
            params: LinearParams { weights, value_weights },
            features,
            action_space,
            lineage: "root".to_string(),
            loss: 1.0,
            mutation_rate: 0.1,
            mutation_strength: 0.2,
        }
    }

    /// Restore a policy from exported parameters.
    pub fn from_params(
        bytes: &[u8],
        features: usize,
        action_space: usize,
    ) -> Result<Self, bincode::Error> {
        let params: LinearParams = bincode::deserialize(bytes)?;
        Ok(Self {
            params,
            features,
            action_space,
            lineage: "restored".to_string(),
            loss: 1.0,
            mutation_rate: 0.1,
            mutation_strength: 0.2,
        })
    }

    fn dot(row: &[f32], state: &[f32]) -> f32 {
        row.iter().zip(state).map(|(w, x)| w * x).sum()
    }
}

impl Policy for LinearPolicy {
    fn predict(&self, state: &EncodedState) -> PolicyOutput {
        let n = self.features.min(state.tensor.len());
        let action_scores = (0..self.action_space)
            .map(|a| {
                let row = &self.params.weights[a * self.features..a * self.features + n];
                Self::dot(row, &state.tensor[..n])
            })
            .collect();
        let value = Self::dot(&self.params.value_weights[..n], &state.tensor[..n]);
        PolicyOutput { action_scores, value }
    }

    fn mutate(&self, rng: &mut SessionRng) -> Arc<dyn Policy> {
        let mut child = self.clone();
        for w in child
            .params
            .weights
            .iter_mut()
            .chain(child.params.value_weights.iter_mut())
        {
            if rng.gen_bool(self.mutation_rate) {
                *w += (rng.gen_f32() - 0.5) * self.mutation_strength;
            }
        }
        let tag = rng.gen_range(0..1000);
        child.lineage = format!("{}/{}", self.lineage, tag);
        Arc::new(child)
    }

    fn update(&self, experience: &Experience) -> Option<Arc<dyn Policy>> {
        // Loss here is the capability's own bookkeeping: invalid-move
        // rate blended with distance from a winning score.
        let attempts = f64::from(experience.moves + experience.invalid_moves).max(1.0);
        let invalid_rate = f64::from(experience.invalid_moves) / attempts;
        let score_term = if experience.won {
            0.0
        } else {
            1.0 / (1.0 + experience.score.max(0) as f64 / 100.0)
        };

        let mut refreshed = self.clone();
        refreshed.loss = 0.5 * invalid_rate + 0.5 * score_term;
        Some(Arc::new(refreshed))
    }

    fn loss_estimate(&self) -> f64 {
        self.loss
    }

    fn lineage(&self) -> String {
        self.lineage.clone()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }

    fn export_params(&self) -> Vec<u8> {
        bincode::serialize(&self.params).unwrap_or_default()
    }
}
