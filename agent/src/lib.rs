//! Deploy Agent Library
//!
//! Core modules for the host-resident deploy agent: node status reporting
//! and container stack deployments driven by the admin panel.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod utils;
pub mod workers;
