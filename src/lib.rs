//! Offline action reconciliation queue.
//!
//! Buffers operations that could not be applied immediately, deduplicates
//! and reorders them, and prunes them as external state makes them obsolete.
//! The queue transitions in `state` are pure; `persistence`, `store` and
//! `server` wrap them for a long-running service.

pub mod commands;
pub mod config;
pub mod persistence;
pub mod server;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
