use serde::{Deserialize, Serialize};

pub const DEFAULT_UNSEEN_PENALTY: f64 = -100.0;

/// Estimation and decoding parameters. Stored in the model so a loaded model decodes
/// with the values it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmmConfig {
    /// Score added in place of an emission log-probability when the word was never
    /// observed under the candidate tag.
    pub unseen_penalty: f64,

    /// Tags whose outgoing transitions are dropped after counting (sentence-final
    /// punctuation). Once reached, decoding cannot leave them.
    pub terminal_tags: Vec<String>,
}

impl Default for HmmConfig {
    fn default() -> Self {
        Self {
            unseen_penalty: DEFAULT_UNSEEN_PENALTY,
            terminal_tags: vec![".".to_string()],
        }
    }
}

impl HmmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unseen_penalty(mut self, penalty: f64) -> Self {
        self.unseen_penalty = penalty;
        self
    }

    pub fn with_terminal_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminal_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_terminal(&self, tag: &str) -> bool {
        self.terminal_tags.iter().any(|t| t == tag)
    }
}
