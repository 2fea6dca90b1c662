//! Compiler from lttoolbox XML dictionaries (`.dix`) to weighted transducers.
//!
//! A dictionary declares an alphabet, paradigms (`<pardef>`) and sections of
//! entries (`<e>`). Each entry becomes one path from the start state to a
//! final state; paradigm references splice a previously compiled paradigm
//! into the path, and `<re>` elements are compiled by a small regular
//! expression engine straight into transducer states.
//!
//! # Architecture
//!
//! - [`options`] -- Compile direction, dictionary type and entry filters
//! - [`tokenizer`] -- Markup fragment to symbol sequence
//! - [`regex`] -- Restricted regular expressions to identity transducers
//! - [`paradigm`] -- Registry of compiled paradigms
//! - [`entry`] -- Entry to transducer path
//! - [`compiler`] -- Document traversal and the resulting root transducer
//!
//! ```no_run
//! use dix_compiler::{CompilerOptions, Direction, DixCompiler};
//!
//! let mut compiler = DixCompiler::new(CompilerOptions::new(Direction::LR));
//! compiler.compile_file("apertium-eng.eng.dix")?;
//! let fst = compiler.transducer();
//! # Ok::<(), dix_compiler::DixError>(())
//! ```

pub mod compiler;
pub mod entry;
pub mod options;
pub mod paradigm;
pub mod regex;
pub mod tokenizer;
mod xml;

use std::path::PathBuf;

pub use compiler::DixCompiler;
pub use options::{CompilerOptions, Direction, DixType};
pub use paradigm::ParadigmRegistry;
pub use regex::{RegexError, compile_regex};

/// Error type for dictionary compilation. Every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum DixError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <dictionary>")]
    WrongRoot(String),
    #[error("unknown compilation direction '{0}'")]
    UnknownDirection(String),
    #[error("unexpected element <{name}> on line {line}")]
    UnexpectedElement { name: String, line: u32 },
    #[error("unnamed pardef on line {line}")]
    UnnamedParadigm { line: u32 },
    #[error("redefinition of pardef {name} on line {line}")]
    DuplicateParadigm { name: String, line: u32 },
    #[error("missing paradigm name on line {line}")]
    MissingParadigmName { line: u32 },
    #[error("paradigm {name} refers to itself on line {line}")]
    SelfReference { name: String, line: u32 },
    #[error("reference to undefined paradigm {name} on line {line}")]
    UndefinedParadigm { name: String, line: u32 },
    #[error("invalid weight '{value}' on line {line}")]
    InvalidWeight { value: String, line: u32 },
    #[error("invalid regular expression on line {line}: {source}")]
    Regex {
        #[source]
        source: RegexError,
        line: u32,
    },
}
