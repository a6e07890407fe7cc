//! Remote completion model
//!
//! Prompt assembly, the HTTP completion client and cleanup of what the model
//! sends back.

pub mod client;
pub mod error;
pub mod prompt;
pub mod sanitize;
pub mod types;

pub use client::{CompletionBackend, CompletionClient, CompletionSettings};
pub use error::{LlmError, Result};
pub use prompt::build_prompt;
pub use sanitize::extract_final_answer;
