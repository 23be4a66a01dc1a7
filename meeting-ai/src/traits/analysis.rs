//! AI analysis provider trait.

use crate::types::analysis::{RosterEntry, TranscriptAnalysis};
use crate::Error;
use async_trait::async_trait;
#[cfg(feature = "mock")]
use mockall::automock;

/// Abstraction for LLM-powered meeting transcript analysis.
///
/// Implementations send the transcript and the team roster to a model and return the
/// summary and action items it extracted. Owners on the returned items are free-text
/// hints; matching them to team members is the caller's concern.
#[cfg_attr(feature = "mock", automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Analyze a transcript and extract a summary plus action items.
    ///
    /// Processing typically takes 10-60 seconds depending on transcript length and model.
    /// The roster lets the model attribute items to people by their known names.
    async fn process_transcript(
        &self,
        transcript: &str,
        roster: &[RosterEntry],
    ) -> std::result::Result<TranscriptAnalysis, Error>;

    /// Return unique identifier for this provider (e.g., "openai", "claude").
    ///
    /// Used for logging and provider selection.
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
