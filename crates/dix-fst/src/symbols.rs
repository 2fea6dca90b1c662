// Reserved symbols and the VFST symbol table.
//
// Symbols are opaque strings. A symbol is either a single character, the
// reserved epsilon, or a multi-character token such as `<n>` or `<ANY_TAG>`.

use crate::FstError;
use crate::transducer::BasicTransducer;
use hashbrown::HashMap;

/// The epsilon symbol. Consumes or produces nothing.
pub const EPSILON: &str = "@_EPSILON_SYMBOL_@";

/// Wildcard matching any single character (separable dictionaries only).
pub const ANY_CHAR: &str = "<ANY_CHAR>";

/// Wildcard matching any tag (separable dictionaries only).
pub const ANY_TAG: &str = "<ANY_TAG>";

#[inline]
pub fn is_epsilon(symbol: &str) -> bool {
    symbol == EPSILON
}

/// Whether `symbol` is one of the separable-mode wildcards.
#[inline]
pub fn is_wildcard(symbol: &str) -> bool {
    symbol == ANY_CHAR || symbol == ANY_TAG
}

/// Whether `symbol` spans more than one character (tags, wildcards, markers).
#[inline]
pub fn is_multichar(symbol: &str) -> bool {
    !is_epsilon(symbol) && symbol.chars().nth(1).is_some()
}

/// Symbol table of a VFST file.
///
/// Symbols are ordered as:
/// 1. Epsilon (index 0) -- empty string
/// 2. Single-character symbols, in code point order
/// 3. Multi-character symbols, in lexical order
///
/// The compiler never produces flag diacritics, so the flag section that
/// precedes the normal characters in some VFST files is always empty here.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Maps symbol index to its string representation (`""` for epsilon).
    pub symbol_strings: Vec<String>,
    /// Maps a symbol string back to its index. Epsilon maps from [`EPSILON`].
    pub symbol_to_index: HashMap<String, u32>,
    /// Index of the first multi-character symbol (equals the symbol count
    /// when there is none).
    pub first_multi_char: u32,
}

impl SymbolTable {
    /// Collect and order every symbol used on the arcs of `t`.
    pub fn from_transducer(t: &BasicTransducer) -> Self {
        let mut singles = Vec::new();
        let mut multis = Vec::new();
        for symbol in t.symbols() {
            if is_multichar(symbol) {
                multis.push(symbol.to_string());
            } else {
                singles.push(symbol.to_string());
            }
        }
        // `symbols()` is already sorted; single chars in code point order,
        // multichar symbols lexically.
        let first_multi_char = (singles.len() + 1) as u32;

        let mut symbol_strings = Vec::with_capacity(singles.len() + multis.len() + 1);
        symbol_strings.push(String::new());
        symbol_strings.extend(singles);
        symbol_strings.extend(multis);

        Self::from_strings(symbol_strings, first_multi_char)
    }

    fn from_strings(symbol_strings: Vec<String>, first_multi_char: u32) -> Self {
        let mut symbol_to_index = HashMap::with_capacity(symbol_strings.len());
        symbol_to_index.insert(EPSILON.to_string(), 0);
        for (i, s) in symbol_strings.iter().enumerate().skip(1) {
            symbol_to_index.insert(s.clone(), i as u32);
        }
        Self {
            symbol_strings,
            symbol_to_index,
            first_multi_char,
        }
    }

    pub fn len(&self) -> usize {
        self.symbol_strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_strings.is_empty()
    }

    /// Index of `symbol`, if it is part of the table.
    pub fn index_of(&self, symbol: &str) -> Option<u32> {
        self.symbol_to_index.get(symbol).copied()
    }

    /// Symbol string for `index`, with index 0 mapped back to [`EPSILON`].
    pub fn symbol(&self, index: u32) -> Option<&str> {
        if index == 0 {
            return Some(EPSILON);
        }
        self.symbol_strings.get(index as usize).map(String::as_str)
    }

    /// Serialize as `count: u16` followed by NUL-terminated UTF-8 strings.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<(), FstError> {
        let count = u16::try_from(self.symbol_strings.len())
            .map_err(|_| FstError::TooManySymbols(self.symbol_strings.len()))?;
        out.extend_from_slice(&count.to_le_bytes());
        for s in &self.symbol_strings {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        Ok(())
    }
}

/// Parse the symbol table from VFST data starting at `offset` (after the header).
///
/// Returns the table and the byte offset immediately after it (before padding).
/// The caller aligns this offset to the transition table boundary.
pub fn parse_symbol_table(data: &[u8], offset: usize) -> Result<(SymbolTable, usize), FstError> {
    if offset + 2 > data.len() {
        return Err(FstError::TooShort {
            expected: offset + 2,
            actual: data.len(),
        });
    }

    let symbol_count = u16::from_le_bytes([data[offset], data[offset + 1]]);
    let mut pos = offset + 2;

    let mut symbol_strings = Vec::with_capacity(symbol_count as usize);
    let mut first_multi_char: u32 = 0;

    for i in 0..symbol_count {
        let str_start = pos;
        while pos < data.len() && data[pos] != 0 {
            pos += 1;
        }
        if pos >= data.len() {
            return Err(FstError::InvalidSymbolTable(
                "unterminated symbol string".to_string(),
            ));
        }
        let symbol_bytes = &data[str_start..pos];
        pos += 1;

        if i == 0 {
            if !symbol_bytes.is_empty() {
                return Err(FstError::InvalidSymbolTable(
                    "symbol 0 must be the empty epsilon string".to_string(),
                ));
            }
            symbol_strings.push(String::new());
            continue;
        }

        let symbol = std::str::from_utf8(symbol_bytes).map_err(|_| {
            FstError::InvalidSymbolTable(format!("invalid UTF-8 in symbol {i}"))
        })?;
        if symbol.is_empty() {
            return Err(FstError::InvalidSymbolTable(format!("empty symbol {i}")));
        }
        if first_multi_char == 0 && is_multichar(symbol) {
            first_multi_char = i as u32;
        }
        symbol_strings.push(symbol.to_string());
    }

    if first_multi_char == 0 {
        first_multi_char = symbol_count as u32;
    }

    Ok((SymbolTable::from_strings(symbol_strings, first_multi_char), pos))
}
