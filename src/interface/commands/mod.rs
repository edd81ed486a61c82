//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., mood, stats, dog).
//! These handlers are invoked by the Router.

pub mod dog;
pub mod help;
pub mod mood;
pub mod stats;
pub mod vote;
