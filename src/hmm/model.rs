use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{counter::FrequencyCounter, tagger::Tagger};
use crate::{
    quark::{Quark, StringTable},
    Dataset, Error, HmmConfig, Result,
};

/// Log-probability of the sentence-start state emitting the sentence-start marker.
pub const START_EMISSION: f64 = 0.0;

/// A decoding state: the sentence-start sentinel or an interned label.
///
/// `Start` lives outside the label id space, so no corpus tag can collide with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Start,
    Label(usize),
}

/// Bigram HMM in the log domain. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmmModel {
    config: HmmConfig,
    labels: Quark,
    words: Quark,
    /// ln P(first label | sentence start)
    starts: HashMap<usize, f64>,
    /// [label] -> follower -> ln P(follower | label)
    transitions: Vec<HashMap<usize, f64>>,
    /// [label] -> word -> ln P(word | label)
    emissions: Vec<HashMap<usize, f64>>,
}

fn log_ratio(n: usize, c: usize) -> f64 {
    (n as f64 / c as f64).ln()
}

fn estimate(counts: &HashMap<usize, usize>, total: usize) -> Result<HashMap<usize, f64>> {
    if total == 0 && !counts.is_empty() {
        return Err(Error::InvalidCorpus("events counted for a tag that never occurred".into()));
    }
    Ok(counts.iter().map(|(&k, &n)| (k, log_ratio(n, total))).collect())
}

impl HmmModel {
    /// Estimates the model from a tagged dataset.
    pub fn train(ds: &Dataset, config: HmmConfig) -> Result<Self> {
        if ds.is_empty() {
            return Err(Error::InvalidCorpus("no training sentences".into()));
        }
        let counter = FrequencyCounter::count(ds, &config)?;
        Self::from_counts(&counter, config)
    }

    /// Turns raw counts into log-probabilities: ln(count(event) / count(tag)).
    pub fn from_counts(counter: &FrequencyCounter, config: HmmConfig) -> Result<Self> {
        let starts = estimate(&counter.starts, counter.num_sentences)?;
        let transitions = counter
            .bigrams
            .iter()
            .zip(&counter.unigrams)
            .map(|(follows, &c)| estimate(follows, c))
            .collect::<Result<Vec<_>>>()?;
        let emissions = counter
            .emissions
            .iter()
            .zip(&counter.unigrams)
            .map(|(words, &c)| estimate(words, c))
            .collect::<Result<Vec<_>>>()?;
        let model = Self {
            config,
            labels: counter.labels.clone(),
            words: counter.words.clone(),
            starts,
            transitions,
            emissions,
        };
        log::info!(
            "model built (labels: {}, words: {}, transitions: {}, emissions: {})",
            model.num_labels(),
            model.num_words(),
            model.starts.len() + model.transitions.iter().map(HashMap::len).sum::<usize>(),
            model.emissions.iter().map(HashMap::len).sum::<usize>()
        );
        Ok(model)
    }

    pub fn tagger(&self) -> Tagger<'_> {
        Tagger::new(self)
    }

    pub fn config(&self) -> &HmmConfig {
        &self.config
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn label(&self, id: usize) -> Option<&str> {
        self.labels.to_str(id)
    }

    pub fn label_id(&self, tag: &str) -> Option<usize> {
        self.labels.to_id(tag)
    }

    pub(crate) fn word_id(&self, word: &str) -> Option<usize> {
        self.words.to_id(word)
    }

    pub fn is_terminal(&self, tag: &str) -> bool {
        self.config.is_terminal(tag)
    }

    fn follow_table(&self, from: State) -> Option<&HashMap<usize, f64>> {
        match from {
            State::Start => Some(&self.starts),
            State::Label(l) => self.transitions.get(l),
        }
    }

    /// Labels reachable from `from` with their transition log-probabilities.
    pub fn followers(&self, from: State) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.follow_table(from)
            .into_iter()
            .flat_map(|m| m.iter().map(|(&l, &p)| (l, p)))
    }

    /// ln P(to | from); `None` as `from` is the sentence start.
    pub fn transition(&self, from: Option<&str>, to: &str) -> Option<f64> {
        let from = match from {
            None => State::Start,
            Some(tag) => State::Label(self.label_id(tag)?),
        };
        self.log_transition(from, self.label_id(to)?)
    }

    pub(crate) fn log_transition(&self, from: State, to: usize) -> Option<f64> {
        self.follow_table(from)?.get(&to).copied()
    }

    /// ln P(word | tag), or `None` if the pair was never observed.
    pub fn emission(&self, tag: &str, word: &str) -> Option<f64> {
        let l = self.label_id(tag)?;
        let w = self.word_id(word)?;
        self.emissions[l].get(&w).copied()
    }

    /// Emission log-probability of `word` under label `l`, or the unseen-word penalty.
    pub(crate) fn emission_score(&self, l: usize, word: Option<usize>) -> f64 {
        word.and_then(|w| self.emissions.get(l)?.get(&w).copied())
            .unwrap_or(self.config.unseen_penalty)
    }

    /// Every transition and emission log-probability, sentence start first.
    pub fn log_probs(&self) -> impl Iterator<Item = f64> + '_ {
        self.starts
            .values()
            .chain(self.transitions.iter().flat_map(HashMap::values))
            .chain(self.emissions.iter().flat_map(HashMap::values))
            .copied()
    }

    pub fn to_writer<W: Write>(&self, w: W) -> Result<()> {
        serde_json::to_writer(w, self)?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.to_writer(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn from_reader<R: Read>(r: R) -> Result<Self> {
        let model: Self = serde_json::from_reader(r)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    fn validate(&self) -> Result<()> {
        let (n_labels, n_words) = (self.num_labels(), self.num_words());
        if self.labels.has_duplicates() || self.words.has_duplicates() {
            return Err(Error::InvalidModel("duplicated label or word".into()));
        }
        if self.transitions.len() != n_labels || self.emissions.len() != n_labels {
            return Err(Error::InvalidModel(format!(
                "{} labels but {} transition rows and {} emission rows",
                n_labels,
                self.transitions.len(),
                self.emissions.len()
            )));
        }
        let follow_ok = |m: &HashMap<usize, f64>| m.keys().all(|&l| l < n_labels);
        if !follow_ok(&self.starts) || !self.transitions.iter().all(follow_ok) {
            return Err(Error::InvalidModel("transition to an unknown label".into()));
        }
        if !self.emissions.iter().all(|m| m.keys().all(|&w| w < n_words)) {
            return Err(Error::InvalidModel("emission of an unknown word".into()));
        }
        if let Some(p) = self.log_probs().find(|p| !(p.is_finite() && *p <= 0.0)) {
            return Err(Error::InvalidModel(format!("not a log-probability: {p}")));
        }
        Ok(())
    }
}
