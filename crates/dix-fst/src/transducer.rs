// Mutable weighted transducer built state by state.
//
// States live in an arena and are addressed by `StateId`; arcs refer to their
// target by id, so cycles are ordinary edges. State 0 is always the start.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use crate::symbols::{EPSILON, is_epsilon, is_multichar};
use crate::{MAX_LOOKUP_OUTPUT, MAX_LOOKUP_STEPS};

/// Handle of a state inside one [`BasicTransducer`].
pub type StateId = u32;

/// A labelled, weighted transition to `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub input: String,
    pub output: String,
    pub target: StateId,
    pub weight: f64,
}

#[derive(Debug, Clone, Default)]
struct State {
    arcs: Vec<Arc>,
    final_weight: Option<f64>,
}

/// Weighted transducer with an explicit state arena.
///
/// Construction is append-only: states are never removed, and the only
/// mutations are new states, new arcs, final weights and splicing in another
/// transducer. Reductions ([`minimize`](Self::minimize),
/// [`connect`](Self::connect)) return a new transducer.
#[derive(Debug, Clone)]
pub struct BasicTransducer {
    states: Vec<State>,
}

impl Default for BasicTransducer {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicTransducer {
    /// Create a transducer holding only the (non-final) start state 0.
    pub fn new() -> Self {
        Self {
            states: vec![State::default()],
        }
    }

    /// Allocate a fresh state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        (self.states.len() - 1) as StateId
    }

    /// Add an arc `from -> to` labelled `input:output`.
    ///
    /// Both states must already exist.
    pub fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        input: &str,
        output: &str,
        weight: f64,
    ) {
        debug_assert!((to as usize) < self.states.len(), "unknown target state {to}");
        self.states[from as usize].arcs.push(Arc {
            input: input.to_string(),
            output: output.to_string(),
            target: to,
            weight,
        });
    }

    /// Make `state` final with `weight`, replacing any previous final weight.
    pub fn set_final_weight(&mut self, state: StateId, weight: f64) {
        self.states[state as usize].final_weight = Some(weight);
    }

    pub fn final_weight(&self, state: StateId) -> Option<f64> {
        self.states.get(state as usize).and_then(|s| s.final_weight)
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.final_weight(state).is_some()
    }

    /// Outgoing arcs of `state`.
    pub fn arcs(&self, state: StateId) -> &[Arc] {
        &self.states[state as usize].arcs
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    /// Iterate over all state ids in allocation order.
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(|s| s as StateId)
    }

    /// Iterate over `(state, final_weight)` for every final state.
    pub fn final_states(&self) -> impl Iterator<Item = (StateId, f64)> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.final_weight.map(|w| (i as StateId, w)))
    }

    /// Every non-epsilon symbol appearing on an arc, sorted.
    pub fn symbols(&self) -> BTreeSet<&str> {
        let mut set = BTreeSet::new();
        for arc in self.states.iter().flat_map(|s| s.arcs.iter()) {
            for symbol in [arc.input.as_str(), arc.output.as_str()] {
                if !is_epsilon(symbol) {
                    set.insert(symbol);
                }
            }
        }
        set
    }

    /// Splice a copy of `other` between `from` and `to`.
    ///
    /// An epsilon arc leads from `from` to the copy of `other`'s start state,
    /// and every final state of the copy gets an epsilon arc to `to` carrying
    /// its final weight. The copied states are not final.
    pub fn insert_transducer(&mut self, from: StateId, to: StateId, other: &BasicTransducer) {
        let offset = self.states.len() as StateId;
        self.states.extend(other.states.iter().map(|s| State {
            arcs: s
                .arcs
                .iter()
                .map(|a| Arc {
                    target: a.target + offset,
                    ..a.clone()
                })
                .collect(),
            final_weight: None,
        }));
        self.add_transition(from, offset, EPSILON, EPSILON, 0.0);
        for (state, weight) in other.final_states() {
            self.add_transition(state + offset, to, EPSILON, EPSILON, weight);
        }
    }

    /// Split `input` into symbols of this transducer.
    ///
    /// Multi-character symbols used on arcs are matched greedily (longest
    /// first); everything else is one symbol per character.
    pub fn tokenize_input(&self, input: &str) -> Vec<String> {
        let mut multichars: Vec<&str> = self
            .symbols()
            .into_iter()
            .filter(|s| is_multichar(s))
            .collect();
        multichars.sort_by_key(|s| std::cmp::Reverse(s.len()));

        let mut symbols = Vec::new();
        let mut rest = input;
        while let Some(c) = rest.chars().next() {
            match multichars.iter().find(|m| rest.starts_with(**m)) {
                Some(m) => {
                    symbols.push(m.to_string());
                    rest = &rest[m.len()..];
                }
                None => {
                    symbols.push(c.to_string());
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        symbols
    }

    /// All outputs for `input`, each with its smallest path weight.
    pub fn lookup(&self, input: &str) -> BTreeMap<String, f64> {
        let symbols = self.tokenize_input(input);
        let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
        self.lookup_symbols(&symbols)
    }

    /// Whether `input` has at least one output.
    pub fn accepts(&self, input: &str) -> bool {
        !self.lookup(input).is_empty()
    }

    /// All outputs for an already tokenized input, each with its smallest
    /// path weight. Output symbols are concatenated; epsilon produces nothing.
    ///
    /// The search is a depth-first walk with an explicit stack. A search node
    /// is revisited only with a strictly smaller weight, output longer than
    /// [`MAX_LOOKUP_OUTPUT`] symbols is cut off, and the walk stops after
    /// [`MAX_LOOKUP_STEPS`] steps.
    pub fn lookup_symbols(&self, input: &[&str]) -> BTreeMap<String, f64> {
        struct Node {
            state: StateId,
            pos: usize,
            output: String,
            output_len: usize,
            weight: f64,
        }

        let mut results: BTreeMap<String, f64> = BTreeMap::new();
        let mut best: HashMap<(StateId, usize, String), f64> = HashMap::new();
        let mut stack = vec![Node {
            state: 0,
            pos: 0,
            output: String::new(),
            output_len: 0,
            weight: 0.0,
        }];
        best.insert((0, 0, String::new()), 0.0);

        let mut steps: u32 = 0;
        while let Some(node) = stack.pop() {
            steps += 1;
            if steps > MAX_LOOKUP_STEPS {
                break;
            }

            if node.pos == input.len() {
                if let Some(final_weight) = self.final_weight(node.state) {
                    let total = node.weight + final_weight;
                    results
                        .entry(node.output.clone())
                        .and_modify(|w| *w = w.min(total))
                        .or_insert(total);
                }
            }

            for arc in self.arcs(node.state) {
                let next_pos = if is_epsilon(&arc.input) {
                    node.pos
                } else if node.pos < input.len() && arc.input == input[node.pos] {
                    node.pos + 1
                } else {
                    continue;
                };

                let mut output = node.output.clone();
                let mut output_len = node.output_len;
                if !is_epsilon(&arc.output) {
                    if output_len >= MAX_LOOKUP_OUTPUT {
                        continue;
                    }
                    output.push_str(&arc.output);
                    output_len += 1;
                }

                let weight = node.weight + arc.weight;
                let key = (arc.target, next_pos, output.clone());
                if best.get(&key).is_some_and(|&w| w <= weight) {
                    continue;
                }
                best.insert(key, weight);
                stack.push(Node {
                    state: arc.target,
                    pos: next_pos,
                    output,
                    output_len,
                    weight,
                });
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "ab" -> "xy" with final weight 2.
    fn ab_to_xy() -> BasicTransducer {
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        let s2 = t.add_state();
        t.add_transition(0, s1, "a", "x", 0.0);
        t.add_transition(s1, s2, "b", "y", 1.0);
        t.set_final_weight(s2, 2.0);
        t
    }

    #[test]
    fn new_has_only_start_state() {
        let t = BasicTransducer::new();
        assert_eq!(t.state_count(), 1);
        assert_eq!(t.transition_count(), 0);
        assert!(!t.is_final(0));
        assert!(t.lookup("").is_empty());
    }

    #[test]
    fn add_state_returns_fresh_ids() {
        let mut t = BasicTransducer::new();
        assert_eq!(t.add_state(), 1);
        assert_eq!(t.add_state(), 2);
        assert_eq!(t.states().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn lookup_simple_path() {
        let t = ab_to_xy();
        let out = t.lookup("ab");
        assert_eq!(out.len(), 1);
        assert_eq!(out["xy"], 3.0);
        assert!(!t.accepts("a"));
        assert!(!t.accepts("abb"));
    }

    #[test]
    fn lookup_keeps_smallest_weight() {
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        t.add_transition(0, s1, "a", "a", 5.0);
        t.add_transition(0, s1, "a", "a", 1.0);
        t.set_final_weight(s1, 0.5);
        assert_eq!(t.lookup("a")["a"], 1.5);
    }

    #[test]
    fn lookup_follows_epsilon_cycles() {
        // a (eps back to start) -- accepts a+
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        t.add_transition(0, s1, "a", "a", 0.0);
        t.add_transition(s1, 0, EPSILON, EPSILON, 0.0);
        t.set_final_weight(s1, 0.0);
        assert!(t.accepts("a"));
        assert!(t.accepts("aaaa"));
        assert!(!t.accepts(""));
    }

    #[test]
    fn lookup_bounds_epsilon_output_loops() {
        let mut t = BasicTransducer::new();
        t.add_transition(0, 0, EPSILON, "x", 0.0);
        t.set_final_weight(0, 0.0);
        let out = t.lookup("");
        assert!(out.contains_key(""));
        assert!(out.contains_key("xxx"));
        assert!(out.keys().all(|k| k.len() <= MAX_LOOKUP_OUTPUT));
    }

    #[test]
    fn tokenize_matches_multichar_symbols() {
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        t.add_transition(0, s1, "<n>", "<n>", 0.0);
        assert_eq!(t.tokenize_input("a<n><x"), vec!["a", "<n>", "<", "x"]);
    }

    #[test]
    fn insert_transducer_bridges_states() {
        let inner = ab_to_xy();
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        t.add_transition(0, s1, "c", "c", 0.0);
        let s2 = t.add_state();
        t.insert_transducer(s1, s2, &inner);
        t.set_final_weight(s2, 0.0);

        assert_eq!(t.state_count(), 3 + inner.state_count());
        assert_eq!(t.lookup("cab")["cxy"], 3.0);
        assert!(!t.accepts("ab"));
        // Copied final states are not final in the host.
        assert_eq!(t.final_states().count(), 1);
    }

    #[test]
    fn symbols_exclude_epsilon() {
        let mut t = ab_to_xy();
        t.add_transition(0, 0, EPSILON, "z", 0.0);
        let symbols: Vec<&str> = t.symbols().into_iter().collect();
        assert_eq!(symbols, vec!["a", "b", "x", "y", "z"]);
    }
}
