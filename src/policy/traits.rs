//! The policy capability boundary.
//!
//! The trainer consumes policies through these traits and never looks
//! inside them. How a policy learns - gradient descent, genetic
//! mutation, anything else - is the capability's business; the core
//! only calls `predict`, `mutate`, `update`, and reads the opaque loss
//! scalar and dashboard metadata.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::SessionRng;

/// Encoded game state as a flat tensor for policy input.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor.
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    #[must_use]
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// Zero-filled state with the given shape.
    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self { tensor: vec![0.0; size], shape }
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    /// True if the tensor is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }
}

/// One prediction: scores over the action space plus a value estimate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyOutput {
    /// Unnormalized preference per action index. Length must equal the
    /// encoder's `action_space_size`.
    pub action_scores: Vec<f32>,

    /// Scalar estimate of the episode's final score from this state.
    pub value: f32,
}

/// Episode outcome handed back to a policy's `update` path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    /// Final episode score.
    pub score: i64,
    /// Applied moves.
    pub moves: u32,
    /// Rejected attempts.
    pub invalid_moves: u32,
    /// Whether the episode ended in a win.
    pub won: bool,
}

/// Encodes a game into policy input.
pub trait StateEncoder: Send + Sync {
    /// Encode the game state.
    fn encode(&self, game: &crate::game::Game) -> EncodedState;

    /// Shape of encoded states.
    fn output_shape(&self) -> Vec<usize>;

    /// Size of the action space this encoder pairs with.
    fn action_space_size(&self) -> usize;
}

/// A decision policy.
///
/// Implementations must be `Send + Sync`: one `Arc<dyn Policy>` may be
/// read from a worker thread while the manager holds another handle.
pub trait Policy: Send + Sync {
    /// Predict action scores and a value estimate.
    fn predict(&self, state: &EncodedState) -> PolicyOutput;

    /// Breed a child from this policy.
    fn mutate(&self, rng: &mut SessionRng) -> Arc<dyn Policy>;

    /// Optionally produce a refreshed policy from episode experience.
    ///
    /// The default declines; evolutionary policies typically rely on
    /// `mutate` at generation boundaries instead.
    fn update(&self, _experience: &Experience) -> Option<Arc<dyn Policy>> {
        None
    }

    /// Opaque loss scalar supplied by the capability. The core reports
    /// it but never computes it.
    fn loss_estimate(&self) -> f64;

    /// Ancestry chain, e.g. "root/3/1".
    fn lineage(&self) -> String;

    /// Short implementation name for the dashboard.
    fn kind(&self) -> &'static str;

    /// Serialize the policy's parameters. Format is owned by the
    /// capability; the core only moves the bytes.
    fn export_params(&self) -> Vec<u8>;
}
