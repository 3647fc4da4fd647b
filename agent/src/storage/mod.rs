//! On-disk agent configuration

pub mod settings;
