//! Weighted finite-state transducer construction.
//!
//! This crate is the automaton layer used by the dictionary compiler: a
//! mutable arena-backed transducer, the structural operations the compiler
//! needs (state allocation, transition insertion, sub-transducer splicing,
//! final weights), a language-preserving state reduction, and writers for the
//! VFST binary format and the AT&T text format.
//!
//! # Architecture
//!
//! - [`symbols`] -- Reserved symbols and the VFST symbol table
//! - [`transducer`] -- [`BasicTransducer`]: states, arcs, insertion, lookup
//! - [`minimize`] -- Trimming and bisimulation-based state merging
//! - [`format`] -- VFST header layout
//! - [`transition`] -- VFST weighted transition records
//! - [`vfst`] -- VFST writer and loader
//! - [`att`] -- AT&T text writer
//!
//! Weights follow the tropical semiring: path weights add up, and among
//! several paths for the same string pair the smallest weight wins.

pub mod att;
pub mod format;
pub mod minimize;
pub mod symbols;
pub mod transducer;
pub mod transition;
pub mod vfst;

pub use symbols::{ANY_CHAR, ANY_TAG, EPSILON};
pub use transducer::{Arc, BasicTransducer, StateId};

/// Error type for transducer serialization and loading.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("invalid magic number in VFST header")]
    InvalidMagic,
    #[error("file too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("type mismatch: expected weighted={expected}, got weighted={actual}")]
    TypeMismatch { expected: bool, actual: bool },
    #[error("invalid symbol table: {0}")]
    InvalidSymbolTable(String),
    #[error("invalid transition table: {0}")]
    InvalidTransitionTable(String),
    #[error("too many symbols for a VFST symbol table: {0}")]
    TooManySymbols(usize),
    #[error("weight {0} does not fit in a 16-bit VFST weight")]
    WeightOutOfRange(f64),
    #[error("transducer accepts nothing and cannot be written")]
    EmptyTransducer,
}

/// Maximum number of search steps in [`BasicTransducer::lookup`].
/// Acts as a safety limit against epsilon cycles with negative weight.
pub const MAX_LOOKUP_STEPS: u32 = 100_000;

/// Maximum number of output symbols collected along one lookup path.
/// Bounds the search when an epsilon-input cycle keeps producing output.
pub const MAX_LOOKUP_OUTPUT: usize = 256;
