// Registry of compiled paradigms.

use dix_fst::BasicTransducer;
use hashbrown::HashMap;

/// Name of the root paradigm that sections compile into.
pub const ROOT: &str = "";

/// Compiled paradigms by name.
///
/// The root paradigm always exists. Named paradigms are defined once and are
/// read-only afterwards; references copy them into the referring automaton.
#[derive(Debug, Clone, Default)]
pub struct ParadigmRegistry {
    root: BasicTransducer,
    paradigms: HashMap<String, BasicTransducer>,
}

impl ParadigmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        name == ROOT || self.paradigms.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&BasicTransducer> {
        if name == ROOT {
            Some(&self.root)
        } else {
            self.paradigms.get(name)
        }
    }

    /// The root paradigm as compiled so far.
    pub fn root(&self) -> &BasicTransducer {
        &self.root
    }

    /// Register a named paradigm. Returns `false` if the name was taken, in
    /// which case the registry is unchanged.
    pub fn define(&mut self, name: &str, transducer: BasicTransducer) -> bool {
        if self.contains(name) {
            return false;
        }
        self.paradigms.insert(name.to_string(), transducer);
        true
    }

    /// Move the root paradigm out so a section can extend it. The registry
    /// holds an empty root until [`restore_root`](Self::restore_root).
    pub fn take_root(&mut self) -> BasicTransducer {
        std::mem::take(&mut self.root)
    }

    pub fn restore_root(&mut self, root: BasicTransducer) {
        self.root = root;
    }

    /// Number of named paradigms.
    pub fn len(&self) -> usize {
        self.paradigms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paradigms.is_empty()
    }

    /// Names of the named paradigms, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.paradigms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
