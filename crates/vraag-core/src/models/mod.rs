//! Data models for results and configuration.

pub mod config;
pub mod result;
