// Entry to transducer path.
//
// Each `<e>` adds one path from state 0 of the paradigm under construction
// to a final state. Entries of one paradigm share only state 0, so the
// paradigm is the union of its entries.

use std::collections::BTreeSet;

use dix_fst::symbols::{is_epsilon, is_wildcard};
use dix_fst::{BasicTransducer, EPSILON, StateId};
use roxmltree::Node;
use tracing::trace;

use crate::DixError;
use crate::options::{CompilerOptions, Direction, DixType};
use crate::paradigm::ParadigmRegistry;
use crate::regex::compile_regex;
use crate::tokenizer::{BOUNDARY, Tokenizer};
use crate::xml::{attr, elements, line_of, tag, unexpected};

/// Element children allowed inside `<e>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryPart {
    /// `<i>`: identity symbols.
    Invariant,
    /// `<ig>`: identity symbols behind a group boundary.
    InvertedInvariant,
    /// `<p>`: a `<l>`/`<r>` pair.
    Pair,
    /// `<par n="..."/>`
    ParadigmRef,
    /// `<re>`: inline regular expression.
    Regex,
}

impl EntryPart {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "i" => Some(EntryPart::Invariant),
            "ig" => Some(EntryPart::InvertedInvariant),
            "p" => Some(EntryPart::Pair),
            "par" => Some(EntryPart::ParadigmRef),
            "re" => Some(EntryPart::Regex),
            _ => None,
        }
    }
}

/// Builds one paradigm (or the root) from its entries.
///
/// The builder owns the transducer being built and borrows everything else
/// from the compiler for the duration of one `<pardef>` or `<section>`.
pub struct ParadigmBuilder<'a> {
    options: &'a CompilerOptions,
    mode: DixType,
    tokenizer: Tokenizer,
    alphabet: &'a BTreeSet<char>,
    registry: &'a ParadigmRegistry,
    name: &'a str,
    transducer: BasicTransducer,
}

impl<'a> ParadigmBuilder<'a> {
    /// Start building paradigm `name` on top of `transducer`.
    pub fn new(
        options: &'a CompilerOptions,
        mode: DixType,
        alphabet: &'a BTreeSet<char>,
        registry: &'a ParadigmRegistry,
        name: &'a str,
        transducer: BasicTransducer,
    ) -> Self {
        Self {
            options,
            mode,
            tokenizer: Tokenizer::new(mode, options.keep_boundaries),
            alphabet,
            registry,
            name,
            transducer,
        }
    }

    /// The transducer built so far.
    pub fn finish(self) -> BasicTransducer {
        self.transducer
    }

    /// Add the path of one `<e>`, unless the entry is filtered out.
    pub fn read_entry(&mut self, entry: Node<'_, '_>) -> Result<(), DixError> {
        if let Some(reason) = self.skip_reason(entry) {
            trace!(line = line_of(entry), paradigm = self.name, reason, "skipping entry");
            return Ok(());
        }

        // Weight errors surface before any state is added.
        let weight = self.entry_weight(entry)?;

        let mut from: StateId = 0;
        for child in elements(entry) {
            let part = EntryPart::from_tag(tag(child)).ok_or_else(|| unexpected(child))?;
            from = match part {
                EntryPart::Invariant => self.read_invariant(child, from, false)?,
                EntryPart::InvertedInvariant => self.read_invariant(child, from, true)?,
                EntryPart::Pair => self.read_pair(child, from)?,
                EntryPart::ParadigmRef => self.read_paradigm_ref(child, from)?,
                EntryPart::Regex => self.read_regex(child, from)?,
            };
        }
        self.transducer.set_final_weight(from, weight);
        Ok(())
    }

    /// Why `entry` contributes nothing to this compilation, if it doesn't.
    fn skip_reason(&self, entry: Node<'_, '_>) -> Option<&'static str> {
        let direction = self.options.direction;
        if attr(entry, "r") == direction.opposite().restriction() {
            return Some("restricted to the other direction");
        }
        if attr(entry, "i") == "yes" {
            return Some("ignored");
        }

        let mismatched = |name: &str, configured: &Option<String>| {
            let value = attr(entry, name);
            !value.is_empty() && value != configured.as_deref().unwrap_or("")
        };
        let options = self.options;
        match direction {
            Direction::RL if mismatched("alt", &options.alt) => Some("alternative"),
            Direction::RL if mismatched("v", &options.var) => Some("variant"),
            Direction::RL if mismatched("vl", &options.var_left) => Some("left variant"),
            Direction::LR if mismatched("vr", &options.var_right) => Some("right variant"),
            _ => None,
        }
    }

    /// `w`, else `wl` (LR) or `wr` (RL), else 0.
    fn entry_weight(&self, entry: Node<'_, '_>) -> Result<f64, DixError> {
        let mut value = attr(entry, "w");
        if value.is_empty() {
            value = match self.options.direction {
                Direction::LR => attr(entry, "wl"),
                Direction::RL => attr(entry, "wr"),
            };
        }
        if value.is_empty() {
            return Ok(0.0);
        }
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|w| w.is_finite())
            .ok_or_else(|| DixError::InvalidWeight {
                value: value.to_string(),
                line: line_of(entry),
            })
    }

    /// One identity arc per symbol of `<i>` or `<ig>`.
    fn read_invariant(
        &mut self,
        node: Node<'_, '_>,
        start: StateId,
        inverted: bool,
    ) -> Result<StateId, DixError> {
        let mut symbols = Vec::new();
        if inverted {
            symbols.push(BOUNDARY.to_string());
        }
        self.tokenizer.read_container(node, &mut symbols)?;

        let mut from = start;
        for symbol in &symbols {
            let to = self.transducer.add_state();
            self.transducer.add_transition(from, to, symbol, symbol, 0.0);
            from = to;
            if self.mode == DixType::Separable && is_wildcard(symbol) {
                self.transducer.add_transition(to, to, symbol, symbol, 0.0);
            }
        }
        Ok(from)
    }

    /// `<p><l>..</l><r>..</r></p>`: sides aligned position by position, the
    /// shorter one padded with epsilon.
    fn read_pair(&mut self, node: Node<'_, '_>, start: StateId) -> Result<StateId, DixError> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for side in elements(node) {
            match tag(side) {
                "l" => self.tokenizer.read_container(side, &mut left)?,
                "r" => self.tokenizer.read_container(side, &mut right)?,
                _ => return Err(unexpected(side)),
            }
        }

        let len = left.len().max(right.len());
        left.resize(len, EPSILON.to_string());
        right.resize(len, EPSILON.to_string());

        let mut from = start;
        for (l, r) in left.iter().zip(&right) {
            if is_epsilon(l) && is_epsilon(r) {
                continue;
            }
            let to = self.transducer.add_state();
            self.transducer.add_transition(from, to, l, r, 0.0);
            from = to;
            if self.mode == DixType::Separable && loops_in_place(l) && loops_in_place(r) {
                self.transducer.add_transition(to, to, l, r, 0.0);
            }
        }
        Ok(from)
    }

    /// `<par n="..."/>`: splice a registered paradigm after `start`.
    fn read_paradigm_ref(
        &mut self,
        node: Node<'_, '_>,
        start: StateId,
    ) -> Result<StateId, DixError> {
        let name = attr(node, "n");
        let line = line_of(node);
        if name.is_empty() {
            return Err(DixError::MissingParadigmName { line });
        }
        if name == self.name {
            return Err(DixError::SelfReference {
                name: name.to_string(),
                line,
            });
        }
        let paradigm = match self.registry.get(name) {
            Some(p) => p,
            None => {
                return Err(DixError::UndefinedParadigm {
                    name: name.to_string(),
                    line,
                });
            }
        };

        let to = self.transducer.add_state();
        self.transducer.insert_transducer(start, to, paradigm);
        Ok(to)
    }

    /// `<re>`: compile the text content against the alphabet and splice it
    /// after `start`.
    fn read_regex(&mut self, node: Node<'_, '_>, start: StateId) -> Result<StateId, DixError> {
        let mut pattern = String::new();
        for child in node.children() {
            if child.is_element() {
                return Err(unexpected(child));
            }
            if child.is_text() {
                pattern.push_str(child.text().unwrap_or_default());
            }
        }

        let line = line_of(node);
        let regex = compile_regex(&pattern, self.alphabet)
            .map_err(|source| DixError::Regex { source, line })?;

        let to = self.transducer.add_state();
        self.transducer.insert_transducer(start, to, &regex);
        Ok(to)
    }
}

/// Pair sides that get a self-loop in separable dictionaries.
#[inline]
fn loops_in_place(symbol: &str) -> bool {
    is_wildcard(symbol) || is_epsilon(symbol)
}
