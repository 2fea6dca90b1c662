// Restricted regular expressions compiled straight into identity transducers.
//
// Grammar (the whole pattern is an implicit group):
//
//   group    := sequence ('|' sequence)*
//   sequence := segment*
//   segment  := atom quantifier?
//   atom     := '(' group ')' | '[' '^'? member* ']' | '\' char | char
//   member   := item ('-' item)?
//   item     := '\' char | char
//
// Parsing is recursive descent over a character cursor, one character of
// lookahead, with states and arcs added as the pattern is read.

use std::collections::BTreeSet;

use dix_fst::{BasicTransducer, EPSILON, StateId};

/// Syntax errors of a regular expression. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegexError {
    #[error("mismatched bracket at offset {0}")]
    MismatchedBracket(usize),
    #[error("unterminated group")]
    UnterminatedGroup,
    #[error("unterminated character class")]
    UnterminatedClass,
    #[error("unexpected quantifier '{0}' at offset {1}")]
    UnexpectedQuantifier(char, usize),
    #[error("trailing backslash")]
    TrailingEscape,
    #[error("invalid range {0}-{1}")]
    InvalidRange(char, char),
    #[error("misplaced '-' in character class at offset {0}")]
    DanglingDash(usize),
    #[error("character class matches nothing")]
    EmptyClass,
}

/// Compile `pattern` into a transducer with identity arcs.
///
/// `alphabet` is the set negated character classes are taken from.
pub fn compile_regex(
    pattern: &str,
    alphabet: &BTreeSet<char>,
) -> Result<BasicTransducer, RegexError> {
    RegexCompiler::new(pattern, alphabet).compile()
}

struct RegexCompiler<'a> {
    pattern: Vec<char>,
    pos: usize,
    alphabet: &'a BTreeSet<char>,
    t: BasicTransducer,
}

impl<'a> RegexCompiler<'a> {
    fn new(pattern: &str, alphabet: &'a BTreeSet<char>) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            pos: 0,
            alphabet,
            t: BasicTransducer::new(),
        }
    }

    fn compile(mut self) -> Result<BasicTransducer, RegexError> {
        let end = self.read_group(0, false)?;
        if self.pos < self.pattern.len() {
            return Err(RegexError::MismatchedBracket(self.pos));
        }
        self.t.set_final_weight(end, 0.0);
        Ok(self.t)
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.pattern.get(self.pos).copied()
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.t.add_transition(from, to, EPSILON, EPSILON, 0.0);
    }

    fn identity(&mut self, from: StateId, to: StateId, c: char) {
        let symbol = c.to_string();
        self.t.add_transition(from, to, &symbol, &symbol, 0.0);
    }

    /// Alternatives from `start` into a shared end state. A nested group
    /// consumes its closing `)`; the top-level group ends with the input.
    fn read_group(&mut self, start: StateId, nested: bool) -> Result<StateId, RegexError> {
        let mut end: Option<StateId> = None;
        loop {
            let alternative_end = self.read_sequence(start)?;
            let end_state = *end.get_or_insert_with(|| self.t.add_state());
            self.epsilon(alternative_end, end_state);

            match self.peek() {
                Some('|') => self.pos += 1,
                Some(')') if nested => {
                    self.pos += 1;
                    return Ok(end_state);
                }
                None if nested => return Err(RegexError::UnterminatedGroup),
                None => return Ok(end_state),
                Some(_) => return Err(RegexError::MismatchedBracket(self.pos)),
            }
        }
    }

    /// Segments from `from` up to the next `|`, `)` or the end of input.
    fn read_sequence(&mut self, mut from: StateId) -> Result<StateId, RegexError> {
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            from = self.read_segment(from, c)?;
        }
        Ok(from)
    }

    /// One atom and its optional quantifier, starting at the character `c`.
    ///
    /// The atom gets its own entry state, reached from `frontier` by epsilon,
    /// so quantifier arcs between entry and exit only ever repeat or skip
    /// this atom.
    fn read_segment(&mut self, frontier: StateId, c: char) -> Result<StateId, RegexError> {
        match c {
            '+' | '*' | '?' => return Err(RegexError::UnexpectedQuantifier(c, self.pos)),
            ']' => return Err(RegexError::MismatchedBracket(self.pos)),
            _ => {}
        }

        let entry = self.t.add_state();
        self.epsilon(frontier, entry);

        let exit = match c {
            '(' => {
                self.pos += 1;
                self.read_group(entry, true)?
            }
            '[' => {
                self.pos += 1;
                self.read_class(entry)?
            }
            '\\' => {
                let escaped = self.read_escape()?;
                self.literal(entry, escaped)
            }
            _ => {
                self.pos += 1;
                self.literal(entry, c)
            }
        };

        match self.peek() {
            Some('+') => {
                self.pos += 1;
                self.epsilon(exit, entry);
            }
            Some('*') => {
                self.pos += 1;
                self.epsilon(exit, entry);
                self.epsilon(entry, exit);
            }
            Some('?') => {
                self.pos += 1;
                self.epsilon(entry, exit);
            }
            _ => {}
        }
        Ok(exit)
    }

    fn literal(&mut self, from: StateId, c: char) -> StateId {
        let to = self.t.add_state();
        self.identity(from, to, c);
        to
    }

    /// Read `\x` at the cursor and return `x`.
    fn read_escape(&mut self) -> Result<char, RegexError> {
        let escaped = self
            .pattern
            .get(self.pos + 1)
            .copied()
            .ok_or(RegexError::TrailingEscape)?;
        self.pos += 2;
        Ok(escaped)
    }

    /// Character class after its `[`. Every member gets its own arc from
    /// `from` to one shared target.
    fn read_class(&mut self, from: StateId) -> Result<StateId, RegexError> {
        let negated = self.peek() == Some('^');
        if negated {
            self.pos += 1;
        }

        let mut members = BTreeSet::new();
        // The previous single member, available as the start of a range.
        let mut range_start: Option<char> = None;
        loop {
            let Some(c) = self.peek() else {
                return Err(RegexError::UnterminatedClass);
            };
            match c {
                ']' => {
                    self.pos += 1;
                    break;
                }
                '-' => {
                    let dash = self.pos;
                    let start = range_start.take().ok_or(RegexError::DanglingDash(dash))?;
                    self.pos += 1;
                    let end = match self.peek() {
                        None => return Err(RegexError::UnterminatedClass),
                        Some(']') | Some('-') => return Err(RegexError::DanglingDash(dash)),
                        Some('\\') => self.read_escape()?,
                        Some(e) => {
                            self.pos += 1;
                            e
                        }
                    };
                    if start >= end {
                        return Err(RegexError::InvalidRange(start, end));
                    }
                    members.extend(start..=end);
                }
                '\\' => {
                    let escaped = self.read_escape()?;
                    members.insert(escaped);
                    range_start = Some(escaped);
                }
                _ => {
                    self.pos += 1;
                    members.insert(c);
                    range_start = Some(c);
                }
            }
        }

        let chars: Vec<char> = if negated {
            self.alphabet.difference(&members).copied().collect()
        } else {
            members.into_iter().collect()
        };
        if chars.is_empty() {
            return Err(RegexError::EmptyClass);
        }

        let to = self.t.add_state();
        for c in chars {
            self.identity(from, to, c);
        }
        Ok(to)
    }
}
