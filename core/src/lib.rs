//! Nudge autonomy audit: synthetic A/B data, the Nudge Autonomy
//! Deficit score, and the ethical trade-off report.

pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod reporter;
pub mod rng;
pub mod scorer;
pub mod types;
