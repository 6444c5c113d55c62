//! calorie-engine: Headless engine for the calorie estimation client
//!
//! This crate provides everything that does not touch a terminal:
//! - Configuration loading
//! - The estimation API schema, validation and HTTP client
//! - The conversation state machine (pure transitions)

pub mod config;
pub mod conversation;
pub mod estimate;

// Re-export commonly used types
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use conversation::{
    ConversationEntry, ConversationLog, ConversationState, Effect, ErrorEntry, EstimationResult,
    RequestState, Step, Ticket, Transition,
};
pub use estimate::{
    Estimate, EstimateError, EstimatePayload, EstimateRequest, EstimationClient,
    FALLBACK_ERROR_MESSAGE,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
