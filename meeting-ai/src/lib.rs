//! Meeting AI abstraction layer for transcript analysis providers.
//!
//! This crate provides a trait-based abstraction over the generative-AI service that
//! turns a raw transcript into a summary and a list of action items. The design is
//! provider-agnostic, enabling applications to swap between LLM vendors without
//! changing application code.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::analysis::{ExtractedActionItem, RosterEntry, TranscriptAnalysis};
