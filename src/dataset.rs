use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{Error, Result};

/// Lowercases a line and splits it on whitespace.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_lowercase).collect()
}

/// One tagged sentence: tokens and their tags, index aligned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sequence {
    tokens: Vec<String>,
    tags: Vec<String>,
}

impl Sequence {
    /// `line` is only used to report a mismatch.
    pub fn new(tokens: Vec<String>, tags: Vec<String>, line: usize) -> Result<Self> {
        if tokens.len() != tags.len() {
            return Err(Error::LengthMismatch { line, tokens: tokens.len(), tags: tags.len() });
        }
        Ok(Self { tokens, tags })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub seqs: Vec<Sequence>,
}

impl Dataset {
    /// Empty sequences are dropped.
    pub fn push(&mut self, seq: Sequence) {
        if !seq.is_empty() {
            self.seqs.push(seq);
        }
    }

    /// Reads a sentence stream and a tag stream in lockstep, one sentence per line.
    pub fn from_readers<S: BufRead, T: BufRead>(sentences: S, tags: T) -> Result<Self> {
        let mut ds = Dataset::default();
        let mut sentences = sentences.lines();
        let mut tags = tags.lines();
        let mut lineno = 0;
        loop {
            lineno += 1;
            let (words, labels) = match (sentences.next(), tags.next()) {
                (None, None) => break,
                (Some(words), Some(labels)) => (words?, labels?),
                (Some(_), None) | (None, Some(_)) => {
                    return Err(Error::InvalidCorpus(format!(
                        "sentence and tag streams differ in length at line {lineno}"
                    )));
                }
            };
            let words = tokenize(&words);
            let labels: Vec<String> = labels.split_whitespace().map(str::to_string).collect();
            if words.is_empty() && labels.is_empty() {
                log::warn!("skip empty line: {lineno}");
                continue;
            }
            ds.push(Sequence::new(words, labels, lineno)?);
        }
        log::info!("read {} sentences, {} tokens", ds.len(), ds.total_items());
        Ok(ds)
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(sentences: P, tags: Q) -> Result<Self> {
        let s = BufReader::new(File::open(sentences)?);
        let t = BufReader::new(File::open(tags)?);
        Self::from_readers(s, t)
    }

    /// Splits flat parallel token/tag vectors at `boundaries`, the exclusive end offset of
    /// each sentence.
    pub fn from_parallel(
        tokens: Vec<String>,
        tags: Vec<String>,
        boundaries: &[usize],
    ) -> Result<Self> {
        if tokens.len() != tags.len() {
            return Err(Error::LengthMismatch { line: 0, tokens: tokens.len(), tags: tags.len() });
        }
        if boundaries.last() != Some(&tokens.len()) {
            return Err(Error::InvalidCorpus(format!(
                "last sentence boundary must be {}, got {:?}",
                tokens.len(),
                boundaries.last()
            )));
        }
        let mut ds = Dataset::default();
        let mut tokens = tokens.into_iter();
        let mut tags = tags.into_iter();
        let mut begin = 0;
        for (i, &end) in boundaries.iter().enumerate() {
            if end <= begin {
                return Err(Error::InvalidCorpus(format!(
                    "sentence boundary #{i} ({end}) does not follow {begin}"
                )));
            }
            let n = end - begin;
            let seq = Sequence::new(
                tokens.by_ref().take(n).collect(),
                tags.by_ref().take(n).collect(),
                i + 1,
            )?;
            ds.push(seq);
            begin = end;
        }
        Ok(ds)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).sum()
    }
}
