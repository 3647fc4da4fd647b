//! Admin panel API client

pub mod client;
pub mod deployments;
pub mod node;
