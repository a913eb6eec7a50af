use super::{
    context::ViterbiContext,
    model::{HmmModel, State},
};
use crate::{Error, Result};

/// Viterbi decoder over a borrowed model. Holds no mutable state, so one tagger can
/// serve any number of sentences, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Tagger<'a> {
    model: &'a HmmModel,
}

impl<'a> Tagger<'a> {
    pub fn new(model: &'a HmmModel) -> Self {
        Self { model }
    }

    /// Finds the best label id sequence for `tokens`.
    pub fn viterbi<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<usize>> {
        if tokens.is_empty() {
            return Err(Error::EmptySentence);
        }
        let mut ctx = ViterbiContext::new(tokens.len());
        for (t, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            if !ctx.step(self.model, self.model.word_id(token)) {
                log::debug!("dead end at {t} ({token:?}) after {} items", ctx.num_items() - 1);
                return Err(Error::DeadEnd { position: t, token: token.to_string() });
            }
        }
        let (labels, score) = ctx.backtrack().ok_or_else(|| Error::DeadEnd {
            position: tokens.len() - 1,
            token: tokens[tokens.len() - 1].as_ref().to_string(),
        })?;
        log::debug!(
            "tagged {} tokens (score: {score}, frontier: {})",
            labels.len(),
            ctx.frontier().len()
        );
        Ok(labels)
    }

    /// Tags a tokenized, lowercased sentence. The output has one tag per token.
    pub fn tag<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<String>> {
        self.viterbi(tokens)?
            .into_iter()
            .map(|l| {
                self.model
                    .label(l)
                    .map(str::to_string)
                    .ok_or_else(|| Error::InvalidModel(format!("unknown label id {l}")))
            })
            .collect()
    }

    /// Scores one given tag path the way the decoder does: sentence-start transition,
    /// then per position a transition plus an emission log-probability or the unseen-word
    /// penalty. `None` if the path is empty, misaligned, or uses an unlearned transition.
    pub fn score<S: AsRef<str>, T: AsRef<str>>(&self, tokens: &[S], tags: &[T]) -> Option<f64> {
        if tokens.is_empty() || tokens.len() != tags.len() {
            return None;
        }
        let mut prev = State::Start;
        let mut r = 0.0;
        for (token, tag) in tokens.iter().zip(tags) {
            let l = self.model.label_id(tag.as_ref())?;
            r += self.model.log_transition(prev, l)?;
            r += self.model.emission_score(l, self.model.word_id(token.as_ref()));
            prev = State::Label(l);
        }
        Some(r)
    }
}
