// State reduction: trimming and bisimulation-based merging.
//
// Both operations preserve the weighted relation of the transducer. The
// merging step identifies states that have the same final weight and the same
// labelled arcs into the same classes; it does not determinize, so the result
// is reduced but not necessarily the unique minimal transducer.

use hashbrown::HashMap;

use crate::StateId;
use crate::symbols::is_epsilon;
use crate::transducer::BasicTransducer;

/// Bit pattern of a weight, with -0.0 folded into 0.0.
#[inline]
fn weight_key(weight: f64) -> u64 {
    (weight + 0.0).to_bits()
}

impl BasicTransducer {
    /// Keep only states that are reachable from the start state and can
    /// reach a final state. The start state is always kept and stays 0.
    pub fn connect(&self) -> BasicTransducer {
        let n = self.state_count();

        let mut accessible = vec![false; n];
        let mut stack = vec![0 as StateId];
        accessible[0] = true;
        while let Some(s) = stack.pop() {
            for arc in self.arcs(s) {
                let t = arc.target as usize;
                if !accessible[t] {
                    accessible[t] = true;
                    stack.push(arc.target);
                }
            }
        }

        let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); n];
        for s in self.states() {
            for arc in self.arcs(s) {
                reverse[arc.target as usize].push(s);
            }
        }
        let mut coaccessible = vec![false; n];
        let mut stack: Vec<StateId> = self.final_states().map(|(s, _)| s).collect();
        for &s in &stack {
            coaccessible[s as usize] = true;
        }
        while let Some(s) = stack.pop() {
            for &p in &reverse[s as usize] {
                if !coaccessible[p as usize] {
                    coaccessible[p as usize] = true;
                    stack.push(p);
                }
            }
        }

        let mut renumber: Vec<Option<StateId>> = vec![None; n];
        let mut result = BasicTransducer::new();
        renumber[0] = Some(0);
        for s in 1..n {
            if accessible[s] && coaccessible[s] {
                renumber[s] = Some(result.add_state());
            }
        }

        for s in self.states() {
            let Some(new_s) = renumber[s as usize] else {
                continue;
            };
            if let Some(w) = self.final_weight(s) {
                result.set_final_weight(new_s, w);
            }
            if !coaccessible[s as usize] {
                // Only the start state can get here; it keeps no arcs.
                continue;
            }
            for arc in self.arcs(s) {
                if let Some(new_t) = renumber[arc.target as usize] {
                    result.add_transition(new_s, new_t, &arc.input, &arc.output, arc.weight);
                }
            }
        }
        result
    }

    /// Trim the transducer, then merge bisimilar states.
    ///
    /// Duplicate arcs and zero-weight epsilon self-loops are dropped. The
    /// result is renumbered with the start state at 0.
    pub fn minimize(&self) -> BasicTransducer {
        let t = self.connect();
        let n = t.state_count();

        // Initial partition: by final weight.
        let mut block = {
            let mut ids: HashMap<Option<u64>, u32> = HashMap::new();
            let mut block = Vec::with_capacity(n);
            for s in t.states() {
                let key = t.final_weight(s).map(weight_key);
                let next = ids.len() as u32;
                block.push(*ids.entry(key).or_insert(next));
            }
            block
        };
        let mut block_count = count_blocks(&block);

        loop {
            let mut ids: HashMap<(u32, Vec<(String, String, u64, u32)>), u32> = HashMap::new();
            let mut refined = Vec::with_capacity(n);
            for s in t.states() {
                let signature = (block[s as usize], arc_signature(&t, s, &block));
                let next = ids.len() as u32;
                refined.push(*ids.entry(signature).or_insert(next));
            }
            let refined_count = count_blocks(&refined);
            block = refined;
            if refined_count == block_count {
                break;
            }
            block_count = refined_count;
        }

        // Blocks are numbered by first occurrence, so state 0 is in block 0.
        let mut result = BasicTransducer::new();
        for _ in 1..block_count {
            result.add_state();
        }
        let mut done = vec![false; block_count];
        for s in t.states() {
            let b = block[s as usize] as usize;
            if done[b] {
                continue;
            }
            done[b] = true;
            if let Some(w) = t.final_weight(s) {
                result.set_final_weight(b as StateId, w);
            }
            for (input, output, weight, target) in arc_signature(&t, s, &block) {
                result.add_transition(b as StateId, target, &input, &output, f64::from_bits(weight));
            }
        }
        result
    }
}

/// Sorted, deduplicated arcs of `s` with targets replaced by their block.
/// Zero-weight epsilon self-loops on the block are left out.
fn arc_signature(t: &BasicTransducer, s: StateId, block: &[u32]) -> Vec<(String, String, u64, u32)> {
    let own = block[s as usize];
    let mut arcs: Vec<(String, String, u64, u32)> = t
        .arcs(s)
        .iter()
        .filter(|a| {
            !(block[a.target as usize] == own
                && is_epsilon(&a.input)
                && is_epsilon(&a.output)
                && a.weight == 0.0)
        })
        .map(|a| {
            (
                a.input.clone(),
                a.output.clone(),
                weight_key(a.weight),
                block[a.target as usize],
            )
        })
        .collect();
    arcs.sort();
    arcs.dedup();
    arcs
}

fn count_blocks(block: &[u32]) -> usize {
    block.iter().map(|&b| b as usize + 1).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EPSILON;

    #[test]
    fn connect_drops_dead_and_unreachable_states() {
        let mut t = BasicTransducer::new();
        let live = t.add_state();
        let dead = t.add_state();
        let unreachable = t.add_state();
        t.add_transition(0, live, "a", "a", 0.0);
        t.add_transition(0, dead, "b", "b", 0.0);
        t.add_transition(unreachable, live, "c", "c", 0.0);
        t.set_final_weight(live, 0.0);

        let c = t.connect();
        assert_eq!(c.state_count(), 2);
        assert_eq!(c.transition_count(), 1);
        assert!(c.accepts("a"));
        assert!(!c.accepts("b"));
    }

    #[test]
    fn connect_keeps_start_of_empty_transducer() {
        let mut t = BasicTransducer::new();
        let s = t.add_state();
        t.add_transition(0, s, "a", "a", 0.0);
        let c = t.connect();
        assert_eq!(c.state_count(), 1);
        assert_eq!(c.transition_count(), 0);
    }

    #[test]
    fn minimize_merges_parallel_suffixes() {
        // "ax" | "bx": the two states before "x" are bisimilar.
        let mut t = BasicTransducer::new();
        for first in ["a", "b"] {
            let s1 = t.add_state();
            let s2 = t.add_state();
            t.add_transition(0, s1, first, first, 0.0);
            t.add_transition(s1, s2, "x", "x", 0.0);
            t.set_final_weight(s2, 0.0);
        }
        assert_eq!(t.state_count(), 5);

        let m = t.minimize();
        assert_eq!(m.state_count(), 3);
        assert!(m.accepts("ax"));
        assert!(m.accepts("bx"));
        assert!(!m.accepts("x"));
    }

    #[test]
    fn minimize_keeps_distinct_final_weights_apart() {
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        let s2 = t.add_state();
        t.add_transition(0, s1, "a", "a", 0.0);
        t.add_transition(0, s2, "b", "b", 0.0);
        t.set_final_weight(s1, 1.0);
        t.set_final_weight(s2, 2.0);

        let m = t.minimize();
        assert_eq!(m.state_count(), 3);
        assert_eq!(m.lookup("a")["a"], 1.0);
        assert_eq!(m.lookup("b")["b"], 2.0);
    }

    #[test]
    fn minimize_preserves_cycles() {
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        let s2 = t.add_state();
        t.add_transition(0, s1, EPSILON, EPSILON, 0.0);
        t.add_transition(s1, s2, "a", "a", 0.0);
        t.add_transition(s2, s1, EPSILON, EPSILON, 0.0);
        t.set_final_weight(s2, 0.0);

        let m = t.minimize();
        assert!(m.accepts("a"));
        assert!(m.accepts("aaa"));
        assert!(!m.accepts(""));
    }

    #[test]
    fn minimize_drops_duplicate_arcs() {
        let mut t = BasicTransducer::new();
        let s1 = t.add_state();
        t.add_transition(0, s1, "a", "a", 0.0);
        t.add_transition(0, s1, "a", "a", 0.0);
        t.set_final_weight(s1, 0.0);
        assert_eq!(t.minimize().transition_count(), 1);
    }
}
