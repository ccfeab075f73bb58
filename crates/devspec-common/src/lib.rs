//! # devspec-common
//!
//! Shared device types, error definitions, configuration models, and
//! constants used across the devspec workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and performs no filesystem access of its own.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
