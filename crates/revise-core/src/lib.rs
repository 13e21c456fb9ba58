//! Core types and scheduling logic for the Revise study tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Persistence and reminder delivery are expressed as traits
//! ([`store::StudyStore`], [`notify::Notifier`]) implemented by other crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod calendar;
pub mod error;
pub mod notify;
pub mod schedule;
pub mod service;
pub mod status;
pub mod store;
pub mod subject;
pub mod topic;

pub use error::{Error, Result};
