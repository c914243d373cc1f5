//! Utility functions and helpers.
pub mod cli;
pub mod git;
