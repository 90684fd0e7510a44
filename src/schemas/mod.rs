// Data structures shared across the crate: user configuration and per-invocation tool records.

pub mod config;
pub mod tools;
