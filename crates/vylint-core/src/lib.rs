//! Core infrastructure for vylint.
//!
//! This crate provides language-agnostic infrastructure:
//! - Patch IR for representing source fixes as changesets
//! - Diagnostics, stable codes and the fix-request policy
//! - Error types and error codes
//! - Rule configuration and its resolution
//! - JSON output types for CLI responses
//! - Text position utilities

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod output;
pub mod patch;
pub mod text;
