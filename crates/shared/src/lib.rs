//! Shared types and configuration for Solera.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Currency codes with strict parsing
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
