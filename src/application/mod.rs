//! # Application Layer
//!
//! Contains the plugin logic and its orchestration: the brain handle, the mood, vote and
//! stats plugins, command routing and the recurring jobs.

pub mod brain;
pub mod mood;
pub mod router;
pub mod scheduler;
pub mod stats;
pub mod vote;

#[cfg(test)]
pub mod testing;
