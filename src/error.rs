use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Token and tag sequences differ in length. `line` is 1-based, 0 when the input
    /// has no line structure.
    #[error("line {line}: {tokens} tokens but {tags} tags")]
    LengthMismatch {
        line: usize,
        tokens: usize,
        tags: usize,
    },
    #[error("invalid corpus: {0}")]
    InvalidCorpus(String),
    #[error("cannot tag an empty sentence")]
    EmptySentence,
    /// No tag of the frontier has a learned follower.
    #[error("no tag can be reached at position {position} ({token:?})")]
    DeadEnd { position: usize, token: String },
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors raised by the decoder for a single sentence; the model itself is fine.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::EmptySentence | Self::DeadEnd { .. })
    }

    /// Errors that abort model construction.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::LengthMismatch { .. } | Self::InvalidCorpus(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify() {
        assert!(Error::EmptySentence.is_decode_failure());
        let e = Error::DeadEnd { position: 2, token: "the".into() };
        assert!(e.is_decode_failure());
        assert!(!e.is_configuration());
        let e = Error::LengthMismatch { line: 1, tokens: 2, tags: 3 };
        assert!(e.is_configuration());
        assert_eq!(e.to_string(), "line 1: 2 tokens but 3 tags");
    }
}
