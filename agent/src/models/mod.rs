//! Wire models shared with the control plane

pub mod deployment;
pub mod node;
