use std::collections::HashMap;

use crate::{
    quark::{Quark, StringTable, TextVectorizer},
    Dataset, Error, HmmConfig, Result, Sequence,
};

/// Raw frequency tables collected from a tagged corpus.
///
/// Labels and words are interned on first sight; every table is indexed by label id.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    pub(crate) labels: Quark,
    pub(crate) words: Quark,
    /// Occurrences of the sentence-start state, one per sentence.
    pub(crate) num_sentences: usize,
    pub(crate) unigrams: Vec<usize>,
    /// Sentence start -> first label.
    pub(crate) starts: HashMap<usize, usize>,
    /// Label -> follower label.
    pub(crate) bigrams: Vec<HashMap<usize, usize>>,
    /// Label -> word.
    pub(crate) emissions: Vec<HashMap<usize, usize>>,
    pub(crate) word_freq: Vec<usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a whole dataset and drops the outgoing transitions of terminal tags.
    pub fn count(ds: &Dataset, config: &HmmConfig) -> Result<Self> {
        let mut counter = Self::new();
        for seq in &ds.seqs {
            counter.count_sequence(seq)?;
        }
        counter.absorb_terminals(&config.terminal_tags);
        log::info!(
            "counted {} sentences (labels: {}, words: {}, tokens: {})",
            counter.num_sentences,
            counter.num_labels(),
            counter.num_words(),
            counter.word_freq.iter().sum::<usize>()
        );
        Ok(counter)
    }

    pub fn count_sequence(&mut self, seq: &Sequence) -> Result<()> {
        self.count_word_given_tag(seq.tokens(), seq.tags())?;
        self.count_tag_unigrams(seq.tags());
        self.count_tag_bigrams(seq.tags());
        Ok(())
    }

    /// One increment per tag, plus one sentence-start occurrence for a non-empty sentence.
    pub fn count_tag_unigrams<S: AsRef<str>>(&mut self, tags: &[S]) {
        if tags.is_empty() {
            return;
        }
        self.num_sentences += 1;
        for tag in tags {
            let l = self.label_id(tag.as_ref());
            self.unigrams[l] += 1;
        }
    }

    /// Counts sentence start -> first tag, then every adjacent pair of the sentence once.
    pub fn count_tag_bigrams<S: AsRef<str>>(&mut self, tags: &[S]) {
        let ids: Vec<usize> = tags.iter().map(|t| self.label_id(t.as_ref())).collect();
        let Some(&first) = ids.first() else {
            return;
        };
        *self.starts.entry(first).or_default() += 1;
        for pair in ids.windows(2) {
            *self.bigrams[pair[0]].entry(pair[1]).or_default() += 1;
        }
    }

    pub fn count_word_given_tag<W: AsRef<str>, S: AsRef<str>>(
        &mut self,
        tokens: &[W],
        tags: &[S],
    ) -> Result<()> {
        if tokens.len() != tags.len() {
            return Err(Error::LengthMismatch { line: 0, tokens: tokens.len(), tags: tags.len() });
        }
        for (word, tag) in tokens.iter().zip(tags) {
            let l = self.label_id(tag.as_ref());
            let w = self.word_id(word.as_ref());
            *self.emissions[l].entry(w).or_default() += 1;
            self.word_freq[w] += 1;
        }
        Ok(())
    }

    /// Clears the follower counts of the given tags. Tags never seen are ignored.
    pub fn absorb_terminals<S: AsRef<str>>(&mut self, terminal_tags: &[S]) {
        for tag in terminal_tags {
            if let Some(l) = self.labels.to_id(tag.as_ref()) {
                log::debug!(
                    "terminal tag {:?}: drop {} followers",
                    tag.as_ref(),
                    self.bigrams[l].len()
                );
                self.bigrams[l].clear();
            }
        }
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    pub fn tag_count(&self, tag: &str) -> usize {
        self.labels.to_id(tag).map_or(0, |l| self.unigrams[l])
    }

    /// `None` as `from` is the sentence start.
    pub fn follow_count(&self, from: Option<&str>, to: &str) -> usize {
        let Some(dst) = self.labels.to_id(to) else {
            return 0;
        };
        let table = match from {
            None => &self.starts,
            Some(src) => match self.labels.to_id(src) {
                Some(src) => &self.bigrams[src],
                None => return 0,
            },
        };
        table.get(&dst).copied().unwrap_or_default()
    }

    pub fn emission_count(&self, tag: &str, word: &str) -> usize {
        match (self.labels.to_id(tag), self.words.to_id(word)) {
            (Some(l), Some(w)) => self.emissions[l].get(&w).copied().unwrap_or_default(),
            _ => 0,
        }
    }

    pub fn word_count(&self, word: &str) -> usize {
        self.words.to_id(word).map_or(0, |w| self.word_freq[w])
    }

    fn label_id(&mut self, tag: &str) -> usize {
        let l = self.labels.find_or_insert(tag);
        if l == self.unigrams.len() {
            self.unigrams.push(0);
            self.bigrams.push(HashMap::new());
            self.emissions.push(HashMap::new());
        }
        l
    }

    fn word_id(&mut self, word: &str) -> usize {
        let w = self.words.find_or_insert(word);
        if w == self.word_freq.len() {
            self.word_freq.push(0);
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(sentences: &str, tags: &str) -> Dataset {
        Dataset::from_readers(sentences.as_bytes(), tags.as_bytes()).expect("failed to read corpus")
    }

    #[test]
    fn toy_corpus() {
        let ds = dataset("dog barks\n", "noun verb\n");
        let c = FrequencyCounter::count(&ds, &HmmConfig::default()).expect("failed to count");
        assert_eq!(c.num_sentences(), 1);
        assert_eq!(c.tag_count("noun"), 1);
        assert_eq!(c.tag_count("verb"), 1);
        assert_eq!(c.follow_count(None, "noun"), 1);
        assert_eq!(c.follow_count(Some("noun"), "verb"), 1);
        assert_eq!(c.emission_count("noun", "dog"), 1);
        assert_eq!(c.emission_count("verb", "barks"), 1);
        assert_eq!(c.emission_count("verb", "dog"), 0);
    }

    #[test]
    fn repeated_tags_counted_once_per_pair() {
        let mut c = FrequencyCounter::new();
        let tags = ["N", "V", "N", "V", "N"];
        c.count_tag_unigrams(&tags);
        c.count_tag_bigrams(&tags);
        assert_eq!(c.tag_count("N"), 3);
        assert_eq!(c.tag_count("V"), 2);
        assert_eq!(c.follow_count(Some("N"), "V"), 2);
        assert_eq!(c.follow_count(Some("V"), "N"), 2);
        assert_eq!(c.follow_count(Some("N"), "N"), 0);
        assert_eq!(c.follow_count(None, "N"), 1);
    }

    #[test]
    fn pairs_do_not_cross_sentences() {
        let ds = dataset("a b\nc d\n", "X Y\nZ X\n");
        let config = HmmConfig::new().with_terminal_tags(Vec::<String>::new());
        let c = FrequencyCounter::count(&ds, &config).expect("failed to count");
        assert_eq!(c.num_sentences(), 2);
        assert_eq!(c.follow_count(Some("Y"), "Z"), 0);
        assert_eq!(c.follow_count(None, "X"), 1);
        assert_eq!(c.follow_count(None, "Z"), 1);
        assert_eq!(c.follow_count(Some("Z"), "X"), 1);
    }

    #[test]
    fn word_given_tag() {
        let mut c = FrequencyCounter::new();
        c.count_word_given_tag(&["run", "run", "fast"], &["V", "N", "ADV"])
            .expect("failed to count");
        c.count_word_given_tag(&["run"], &["V"]).expect("failed to count");
        assert_eq!(c.emission_count("V", "run"), 2);
        assert_eq!(c.emission_count("N", "run"), 1);
        assert_eq!(c.word_count("run"), 3);
        assert_eq!(c.num_words(), 2);

        let ret = c.count_word_given_tag(&["run"], &["V", "N"]);
        assert!(matches!(ret, Err(Error::LengthMismatch { tokens: 1, tags: 2, .. })));
        assert_eq!(c.word_count("run"), 3);
    }

    #[test]
    fn terminal_tags_absorb() {
        let ds = dataset("hi . there .\n", "X . Y .\n");
        let c = FrequencyCounter::count(&ds, &HmmConfig::default()).expect("failed to count");
        assert_eq!(c.tag_count("."), 2);
        assert_eq!(c.follow_count(Some("."), "Y"), 0);
        assert!(c.bigrams[c.labels.to_id(".").expect("no label")].is_empty());
        assert_eq!(c.follow_count(Some("X"), "."), 1);
    }
}
