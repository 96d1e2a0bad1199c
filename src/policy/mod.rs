//! Policy capability boundary: encoding, prediction, breeding.
//!
//! The trainer drives games through the `StateEncoder` and `Policy`
//! traits and the fixed action space in `actions`. Model internals are
//! out of scope; `stubs` provides baselines so the engine runs without
//! an external model.

pub mod actions;
pub mod encoder;
pub mod stubs;
pub mod traits;

pub use actions::{decode_action, encode_action, ACTION_SPACE, PILE_COUNT};
pub use encoder::{SolitaireEncoder, ZeroEncoder};
pub use stubs::{LinearParams, LinearPolicy, UniformPolicy};
pub use traits::{EncodedState, Experience, Policy, PolicyOutput, StateEncoder};
