//! Part-of-speech tagging with a bigram hidden Markov model.
//!
//! Counts tag transitions and word emissions in a tagged corpus, turns them into
//! log-probabilities and decodes new sentences with the Viterbi algorithm.
//!
//! ```
//! use hmmtag::{build_model, decode, HmmConfig};
//!
//! let tokens = ["dog", "barks"].map(String::from).to_vec();
//! let tags = ["noun", "verb"].map(String::from).to_vec();
//! let model = build_model(tokens, tags, &[2], HmmConfig::default()).unwrap();
//! assert_eq!(decode(&model, &["dog", "barks"]).unwrap(), ["noun", "verb"]);
//! ```

pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod quark;

pub use dataset::{tokenize, Dataset, Sequence};
pub use error::{Error, Result};
pub use evaluation::{Estimation, Evaluation};
pub use hmm::{
    config::HmmConfig,
    counter::FrequencyCounter,
    model::{HmmModel, State, START_EMISSION},
    tagger::Tagger,
};

/// Builds a model from flat parallel token and tag vectors. `boundaries` holds the
/// exclusive end offset of each sentence.
pub fn build_model(
    tokens: Vec<String>,
    tags: Vec<String>,
    boundaries: &[usize],
    config: HmmConfig,
) -> Result<HmmModel> {
    let ds = Dataset::from_parallel(tokens, tags, boundaries)?;
    HmmModel::train(&ds, config)
}

/// Tags one lowercased, tokenized sentence.
pub fn decode<S: AsRef<str>>(model: &HmmModel, tokens: &[S]) -> Result<Vec<String>> {
    model.tagger().tag(tokens)
}
