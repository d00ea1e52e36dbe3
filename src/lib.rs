//! Keymint - Self-hosted license key server
//!
//! This library provides the core functionality for the Keymint licensing
//! system: license key generation, the activation/validation lifecycle engine,
//! database operations, and the HTTP API handlers.

pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod keygen;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod util;
