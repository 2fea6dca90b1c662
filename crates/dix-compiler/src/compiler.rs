// Document traversal: alphabet, pardefs and sections into one root transducer.

use std::collections::BTreeSet;
use std::path::Path;

use dix_fst::BasicTransducer;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

use crate::DixError;
use crate::entry::ParadigmBuilder;
use crate::options::{CompilerOptions, DixType};
use crate::paradigm::{ParadigmRegistry, ROOT};
use crate::xml::{attr, elements, line_of, tag, unexpected};

/// Element children allowed directly under `<dictionary>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopLevel {
    Alphabet,
    Sdefs,
    Pardefs,
    Section,
}

impl TopLevel {
    fn from_tag(name: &str) -> Option<Self> {
        match name {
            "alphabet" => Some(TopLevel::Alphabet),
            "sdefs" => Some(TopLevel::Sdefs),
            "pardefs" => Some(TopLevel::Pardefs),
            "section" => Some(TopLevel::Section),
            _ => None,
        }
    }
}

/// Compiles `.dix` documents into a weighted transducer.
///
/// One compiler owns the alphabet and the paradigm registry of a
/// compilation. Compiling several documents with the same compiler adds
/// their sections to the same root; after an error the compiler should be
/// discarded.
#[derive(Debug, Clone)]
pub struct DixCompiler {
    options: CompilerOptions,
    mode: DixType,
    alphabet: BTreeSet<char>,
    registry: ParadigmRegistry,
}

impl DixCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            mode: DixType::default(),
            alphabet: BTreeSet::new(),
            registry: ParadigmRegistry::new(),
        }
    }

    /// Read and compile the dictionary at `path`.
    pub fn compile_file(&mut self, path: impl AsRef<Path>) -> Result<(), DixError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DixError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "read dictionary");
        self.compile_str(&text)
    }

    /// Compile a dictionary held in memory.
    pub fn compile_str(&mut self, text: &str) -> Result<(), DixError> {
        let mut opts = ParsingOptions::default();
        opts.allow_dtd = true;
        let doc = Document::parse_with_options(text, opts)?;
        self.compile_document(&doc)
    }

    /// Compile an already parsed document.
    pub fn compile_document(&mut self, doc: &Document<'_>) -> Result<(), DixError> {
        let root = doc.root_element();
        if tag(root) != "dictionary" {
            return Err(DixError::WrongRoot(tag(root).to_string()));
        }
        self.mode = DixType::from_type_attr(attr(root, "type"));
        debug!(mode = ?self.mode, direction = %self.options.direction, "compiling dictionary");

        for child in elements(root) {
            match TopLevel::from_tag(tag(child)).ok_or_else(|| unexpected(child))? {
                TopLevel::Alphabet => self.read_alphabet(child)?,
                TopLevel::Sdefs => {}
                TopLevel::Pardefs => {
                    for pardef in elements(child) {
                        if tag(pardef) != "pardef" {
                            return Err(unexpected(pardef));
                        }
                        self.read_pardef(pardef)?;
                    }
                }
                TopLevel::Section => self.read_section(child)?,
            }
        }
        Ok(())
    }

    /// Add the characters of `<alphabet>` to the alphabet. Whitespace is
    /// layout and is not added.
    fn read_alphabet(&mut self, node: Node<'_, '_>) -> Result<(), DixError> {
        if let Some(child) = elements(node).next() {
            return Err(unexpected(child));
        }
        for text in node.children().filter(|n| n.is_text()) {
            let chars = text.text().unwrap_or_default().chars();
            self.alphabet.extend(chars.filter(|c| !c.is_whitespace()));
        }
        Ok(())
    }

    fn read_pardef(&mut self, node: Node<'_, '_>) -> Result<(), DixError> {
        let name = attr(node, "n");
        let line = line_of(node);
        if name.is_empty() {
            return Err(DixError::UnnamedParadigm { line });
        }
        if self.registry.contains(name) {
            return Err(DixError::DuplicateParadigm {
                name: name.to_string(),
                line,
            });
        }

        let transducer = self.read_entries(node, name, BasicTransducer::new())?;
        debug!(
            paradigm = name,
            states = transducer.state_count(),
            arcs = transducer.transition_count(),
            "defined paradigm"
        );
        self.registry.define(name, transducer);
        Ok(())
    }

    /// Entries of a `<section>` extend the root paradigm.
    fn read_section(&mut self, node: Node<'_, '_>) -> Result<(), DixError> {
        let id = attr(node, "id");
        match attr(node, "type") {
            "" | "standard" => {}
            other => warn!(
                section = id,
                line = line_of(node),
                "section type '{other}' is not supported, compiling as standard"
            ),
        }

        let root = self.registry.take_root();
        let root = self.read_entries(node, ROOT, root)?;
        debug!(
            section = id,
            states = root.state_count(),
            arcs = root.transition_count(),
            "compiled section"
        );
        self.registry.restore_root(root);
        Ok(())
    }

    /// Run every `<e>` child of `node` through a builder for `name`.
    fn read_entries(
        &self,
        node: Node<'_, '_>,
        name: &str,
        transducer: BasicTransducer,
    ) -> Result<BasicTransducer, DixError> {
        let mut builder = ParadigmBuilder::new(
            &self.options,
            self.mode,
            &self.alphabet,
            &self.registry,
            name,
            transducer,
        );
        for entry in elements(node) {
            if tag(entry) != "e" {
                return Err(unexpected(entry));
            }
            builder.read_entry(entry)?;
        }
        Ok(builder.finish())
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Dictionary type of the last compiled document.
    pub fn mode(&self) -> DixType {
        self.mode
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn registry(&self) -> &ParadigmRegistry {
        &self.registry
    }

    /// The root transducer as built, before any reduction.
    pub fn root(&self) -> &BasicTransducer {
        self.registry.root()
    }

    /// The compiled dictionary: the minimized root transducer.
    pub fn transducer(&self) -> BasicTransducer {
        self.registry.root().minimize()
    }
}
