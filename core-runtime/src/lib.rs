//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the streaming player core:
//! - Logging and tracing infrastructure
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the player crates depend on. It
//! establishes the logging conventions and event broadcasting mechanisms used
//! throughout the system: the player controller and position poller publish
//! typed events here, and host UIs subscribe to them.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
