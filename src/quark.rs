use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub trait StringTable {
    fn to_str(&self, id: usize) -> Option<&str>;
    fn to_id(&self, s: &str) -> Option<usize>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait TextVectorizer {
    fn find_or_insert(&mut self, key: &str) -> usize;
}

/// Bidirectional string <-> dense id table. Ids are assigned in insertion order.
///
/// Serialized as the plain list of strings; the reverse index is rebuilt on load.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Quark {
    v: Vec<String>,
    m: HashMap<String, usize>,
}

impl From<Vec<String>> for Quark {
    fn from(value: Vec<String>) -> Self {
        let m = value.iter().enumerate().map(|(i, s)| (s.to_string(), i)).collect();
        Self { v: value, m }
    }
}

impl From<Quark> for Vec<String> {
    fn from(value: Quark) -> Self {
        value.v
    }
}

impl StringTable for Quark {
    fn to_str(&self, id: usize) -> Option<&str> {
        self.v.get(id).map(|x| x.as_str())
    }

    fn to_id(&self, s: &str) -> Option<usize> {
        self.m.get(s).copied()
    }

    fn len(&self) -> usize {
        self.v.len()
    }
}

impl TextVectorizer for Quark {
    fn find_or_insert(&mut self, key: &str) -> usize {
        if let Some(&idx) = self.m.get(key) {
            return idx;
        }
        let idx = self.v.len();
        self.m.insert(key.to_string(), idx);
        self.v.push(key.to_string());
        idx
    }
}

impl Quark {
    /// Duplicated strings keep their first id, so the table can be shorter than the input.
    pub(crate) fn has_duplicates(&self) -> bool {
        self.m.len() != self.v.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_str() {
        let mut quark = Quark::default();
        let cases = [("zero", 0), ("one", 1), ("two", 2), ("three", 3), ("two", 2), ("one", 1)];
        for (s, id) in cases.into_iter().chain([("zero", 0), ("four", 4)]) {
            assert_eq!(id, quark.find_or_insert(s), "{} != {}", s, id);
        }
        assert_eq!(quark.len(), 5);
    }

    #[test]
    fn find_by_id() {
        let mut quark = Quark::default();
        quark.find_or_insert("zero");
        quark.find_or_insert("one");
        assert_eq!(quark.to_str(0), Some("zero"));
        assert_eq!(quark.to_str(1), Some("one"));
        assert_eq!(quark.to_str(2), None);
        assert_eq!(quark.to_id("one"), Some(1));
        assert_eq!(quark.to_id("two"), None);
    }

    #[test]
    fn serialize_as_list() {
        let quark = Quark::from(vec!["nn".to_string(), "vb".to_string()]);
        let s = serde_json::to_string(&quark).expect("failed to serialize");
        assert_eq!(s, r#"["nn","vb"]"#);
        let back: Quark = serde_json::from_str(&s).expect("failed to deserialize");
        assert_eq!(back.to_id("vb"), Some(1));
        assert!(!back.has_duplicates());

        let dup: Quark = serde_json::from_str(r#"["nn","nn"]"#).expect("failed to deserialize");
        assert!(dup.has_duplicates());
    }
}
