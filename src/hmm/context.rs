use std::collections::{hash_map::Entry, HashMap};

use super::model::{HmmModel, State, START_EMISSION};

/// Working space of one Viterbi search. Each decode owns its own context.
#[derive(Debug)]
pub(crate) struct ViterbiContext {
    /// States reachable at the current position with their best cumulative score,
    /// in ascending state order.
    frontier: Vec<(State, f64)>,

    /// Backward edges.
    /// Element [t][j] is the state at t-1 that yields the maximum score to arrive at
    /// (t, j). Only labels reached at t have an entry.
    backward_edge: Vec<HashMap<usize, State>>,
}

impl ViterbiContext {
    pub fn new(num_items: usize) -> Self {
        Self {
            frontier: vec![(State::Start, START_EMISSION)],
            backward_edge: Vec::with_capacity(num_items),
        }
    }

    pub fn num_items(&self) -> usize {
        self.backward_edge.len()
    }

    pub fn frontier(&self) -> &[(State, f64)] {
        &self.frontier
    }

    /// Advances the frontier by one token. `word` is the token's id in the model
    /// vocabulary, `None` when unseen. Returns false when no state is reachable.
    pub fn step(&mut self, model: &HmmModel, word: Option<usize>) -> bool {
        let mut next: HashMap<usize, (f64, State)> = HashMap::new();
        for &(src, score) in &self.frontier {
            for (dst, trans) in model.followers(src) {
                let s = score + trans + model.emission_score(dst, word);
                match next.entry(dst) {
                    Entry::Vacant(e) => {
                        e.insert((s, src));
                    }
                    /* Sources come in ascending order: the first of equal scores wins. */
                    Entry::Occupied(mut e) => {
                        if e.get().0 < s {
                            e.insert((s, src));
                        }
                    }
                }
            }
        }

        let mut frontier: Vec<(State, f64)> =
            next.iter().map(|(&l, &(s, _))| (State::Label(l), s)).collect();
        frontier.sort_by(|a, b| a.0.cmp(&b.0));
        self.frontier = frontier;
        self.backward_edge
            .push(next.into_iter().map(|(l, (_, src))| (l, src)).collect());
        !self.frontier.is_empty()
    }

    /// Picks the best final state and traces the backward links.
    /// Returns the label path and its score, or `None` before the first step or after a
    /// dead end.
    pub fn backtrack(&self) -> Option<(Vec<usize>, f64)> {
        let n = self.num_items();
        let mut best: Option<(usize, f64)> = None;
        for &(state, score) in &self.frontier {
            if let State::Label(l) = state {
                if best.map_or(true, |(_, max_score)| max_score < score) {
                    best = Some((l, score));
                }
            }
        }
        let (last, max_score) = best?;

        let mut labels = vec![0; n];
        labels[n - 1] = last;
        for t in (1..n).rev() {
            match self.backward_edge[t].get(&labels[t]) {
                Some(&State::Label(i)) => labels[t - 1] = i,
                _ => return None,
            }
        }
        Some((labels, max_score))
    }
}
