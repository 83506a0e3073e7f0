//! Chain module - External collaborator interfaces and their simulation

mod collaborators;
pub mod sim;

pub use collaborators::*;
pub use sim::{FeeToken, Pair, SimChain};
