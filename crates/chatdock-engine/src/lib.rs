//! chatdock-engine: Headless core of the chatdock assistant widget
//!
//! This crate provides everything that does not touch the terminal:
//! - The conversation state machine and its controller
//! - Transcript messages
//! - The generation service seam and the Gemini HTTP client
//! - Configuration loading

pub mod config;
pub mod conversation;
pub mod gemini;
pub mod generation;
pub mod message;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use conversation::{
    Conversation, ConversationController, InFlight, Phase, Rejection, ReplyTicket, SubmitOutcome,
    FALLBACK_REPLY,
};
pub use gemini::GeminiClient;
pub use generation::{generate_within, GenerationError, GenerationService};
pub use message::{clock_label, Message, Sender, Transcript};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
