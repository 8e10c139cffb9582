mod gateway;
mod verifier;

pub use gateway::*;
pub use verifier::*;
