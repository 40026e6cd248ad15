//! Common test utilities for metaform contract and scenario tests.
//!
//! This module provides:
//! - `TestProject`: Isolated project in a temp directory, plus conversion and CLI helpers
//! - Fixtures: Reusable document constants

#![allow(dead_code)]

pub mod fixtures;
pub mod project;

pub use fixtures::*;
pub use project::*;
