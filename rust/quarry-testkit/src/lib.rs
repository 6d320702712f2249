//! Test utilities for the Quarry project.
//!
//! This crate provides:
//! - Builders for encoded document rows
//! - Pre-populated in-memory stores
//!
//! # Usage
//!
//! This crate is primarily intended for use within the Quarry project's test suite
//! and development tools.

pub mod docs;
