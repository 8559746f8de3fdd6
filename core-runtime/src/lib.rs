//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the import pipeline:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Import event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the pipeline and service crates
//! depend on. It establishes the logging conventions, the configuration
//! surface and the event broadcasting used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
