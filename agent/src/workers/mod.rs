//! Background workers

pub mod status;
