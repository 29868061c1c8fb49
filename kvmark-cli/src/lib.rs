//! kvmark CLI library
//!
//! This library exposes profile and output types for testing and reuse.

pub mod config;
pub mod output;
