//! Trigger keyword extraction from mention text.

use log::debug;
use regex::Regex;

use crate::error::{BotError, Result};

/// Finds `/u/<identifier> <keyword>` mentions in free text.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    pattern: Regex,
}

impl KeywordExtractor {
    /// Build an extractor for the given bot identifier (without the `u/` prefix).
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty.
    pub fn new(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(BotError::Config(
                "mention identifier must not be empty".to_string(),
            ));
        }

        let pattern = Regex::new(&format!(r"(?i)/?u/{}\s+(\w+)", regex::escape(identifier)))
            .map_err(|e| BotError::Config(format!("invalid mention pattern: {e}")))?;

        Ok(Self { pattern })
    }

    /// Returns the lowercased keyword following the first mention, if any.
    #[must_use]
    pub fn extract(&self, body: &str) -> Option<String> {
        let keyword = self
            .pattern
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_lowercase())?;

        debug!("Extracted keyword '{keyword}'");
        Some(keyword)
    }
}
