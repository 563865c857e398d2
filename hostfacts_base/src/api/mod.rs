//! # Public API
//!
//! The engine facade plus its configuration and error types.

pub mod config;
pub mod engine;
pub mod errors;

pub use config::EngineConfig;
pub use engine::FactEngine;
pub use errors::EngineError;
