// Markup fragment to symbol sequence.
//
// The content of `<i>`, `<ig>`, `<l>` and `<r>` is a mix of text and inline
// tags. Text yields one symbol per character; each recognized tag yields a
// fixed symbol (or a bracketed tag name for `<s n="..."/>`).

use dix_fst::{ANY_CHAR, ANY_TAG};
use roxmltree::Node;

use crate::DixError;
use crate::options::DixType;
use crate::xml::{attr, tag, unexpected};

/// Group boundary, emitted by `<g>` and at the start of `<ig>`.
pub const BOUNDARY: &str = "#";
/// `<a/>`: post-generation anchor.
pub const TILDE: &str = "~";
/// `<b/>`: blank.
pub const BLANK: &str = " ";
/// `<j/>` in standard dictionaries.
pub const JOIN: &str = "+";
/// `<j/>` in separable dictionaries.
pub const SEPARABLE_JOIN: &str = "<$>";
/// `<m/>` when morpheme boundaries are kept.
pub const MORPHEME_BOUNDARY: &str = ">";

/// Inline tags recognized inside a markup fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// `<a/>`
    Tilde,
    /// `<b/>`
    Blank,
    /// `<g>...</g>`
    Group,
    /// `<j/>`
    Join,
    /// `<m/>`
    MorphemeBoundary,
    /// `<s n="..."/>`
    Tag,
    /// `<t/>`, separable only
    AnyTag,
    /// `<w/>`, separable only
    AnyChar,
}

impl Markup {
    /// Classify an element name. `None` for anything not valid in `mode`.
    pub fn from_tag(name: &str, mode: DixType) -> Option<Self> {
        match (name, mode) {
            ("a", _) => Some(Markup::Tilde),
            ("b", _) => Some(Markup::Blank),
            ("g", _) => Some(Markup::Group),
            ("j", _) => Some(Markup::Join),
            ("m", _) => Some(Markup::MorphemeBoundary),
            ("s", _) => Some(Markup::Tag),
            ("t", DixType::Separable) => Some(Markup::AnyTag),
            ("w", DixType::Separable) => Some(Markup::AnyChar),
            _ => None,
        }
    }
}

/// Turns markup fragments into symbols for one dictionary type.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    mode: DixType,
    keep_boundaries: bool,
}

impl Tokenizer {
    pub fn new(mode: DixType, keep_boundaries: bool) -> Self {
        Self {
            mode,
            keep_boundaries,
        }
    }

    /// Symbols for all children of `node`.
    pub fn tokenize(&self, node: Node<'_, '_>) -> Result<Vec<String>, DixError> {
        let mut symbols = Vec::new();
        self.read_container(node, &mut symbols)?;
        Ok(symbols)
    }

    /// Append the symbols of all children of `node` to `symbols`.
    pub fn read_container(
        &self,
        node: Node<'_, '_>,
        symbols: &mut Vec<String>,
    ) -> Result<(), DixError> {
        for child in node.children() {
            self.read_segment(child, symbols)?;
        }
        Ok(())
    }

    /// Append the symbols of a single text node or inline tag.
    pub fn read_segment(
        &self,
        node: Node<'_, '_>,
        symbols: &mut Vec<String>,
    ) -> Result<(), DixError> {
        if node.is_text() {
            let text = node.text().unwrap_or_default();
            symbols.extend(text.chars().map(String::from));
            return Ok(());
        }
        if !node.is_element() {
            return Ok(());
        }

        let markup = Markup::from_tag(tag(node), self.mode).ok_or_else(|| unexpected(node))?;
        match markup {
            Markup::Tilde => symbols.push(TILDE.to_string()),
            Markup::Blank => symbols.push(BLANK.to_string()),
            Markup::Group => {
                symbols.push(BOUNDARY.to_string());
                self.read_container(node, symbols)?;
            }
            Markup::Join => match self.mode {
                DixType::Standard => symbols.push(JOIN.to_string()),
                DixType::Separable => symbols.push(SEPARABLE_JOIN.to_string()),
            },
            Markup::MorphemeBoundary => {
                if self.keep_boundaries {
                    symbols.push(MORPHEME_BOUNDARY.to_string());
                }
            }
            Markup::Tag => symbols.push(format!("<{}>", attr(node, "n"))),
            Markup::AnyTag => symbols.push(ANY_TAG.to_string()),
            Markup::AnyChar => symbols.push(ANY_CHAR.to_string()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn tokenize(xml: &str, mode: DixType, keep_boundaries: bool) -> Result<Vec<String>, DixError> {
        let doc = Document::parse(xml).unwrap();
        Tokenizer::new(mode, keep_boundaries).tokenize(doc.root_element())
    }

    fn symbols(xml: &str, mode: DixType) -> Vec<String> {
        tokenize(xml, mode, false).unwrap()
    }

    #[test]
    fn text_is_one_symbol_per_character() {
        assert_eq!(symbols("<i>kät</i>", DixType::Standard), vec!["k", "ä", "t"]);
    }

    #[test]
    fn fixed_symbol_tags() {
        assert_eq!(
            symbols("<i>a<a/>b<b/>c<j/>d</i>", DixType::Standard),
            vec!["a", "~", "b", " ", "c", "+", "d"]
        );
    }

    #[test]
    fn tag_names_are_bracketed() {
        assert_eq!(
            symbols(r#"<l>cat<s n="n"/><s n="pl"/></l>"#, DixType::Standard),
            vec!["c", "a", "t", "<n>", "<pl>"]
        );
    }

    #[test]
    fn group_emits_boundary_then_content() {
        assert_eq!(
            symbols(r#"<i>take<g><b/>off</g></i>"#, DixType::Standard),
            vec!["t", "a", "k", "e", "#", " ", "o", "f", "f"]
        );
    }

    #[test]
    fn join_depends_on_mode() {
        assert_eq!(symbols("<i><j/></i>", DixType::Standard), vec!["+"]);
        assert_eq!(symbols("<i><j/></i>", DixType::Separable), vec!["<$>"]);
    }

    #[test]
    fn morpheme_boundary_needs_keep_boundaries() {
        assert_eq!(tokenize("<i>a<m/>b</i>", DixType::Standard, false).unwrap(), vec!["a", "b"]);
        assert_eq!(
            tokenize("<i>a<m/>b</i>", DixType::Standard, true).unwrap(),
            vec!["a", ">", "b"]
        );
    }

    #[test]
    fn wildcards_only_in_separable_mode() {
        assert_eq!(
            symbols("<l><w/><t/></l>", DixType::Separable),
            vec![ANY_CHAR, ANY_TAG]
        );
        let err = tokenize("<l>\n<w/></l>", DixType::Standard, false).unwrap_err();
        assert!(matches!(
            err,
            DixError::UnexpectedElement { ref name, line: 2 } if name == "w"
        ));
        assert!(tokenize("<l><t/></l>", DixType::Standard, false).is_err());
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = tokenize("<i><x/></i>", DixType::Separable, false).unwrap_err();
        assert!(matches!(err, DixError::UnexpectedElement { ref name, .. } if name == "x"));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(symbols("<i>a<!-- note -->b</i>", DixType::Standard), vec!["a", "b"]);
    }

    #[test]
    fn markup_classification() {
        assert_eq!(Markup::from_tag("s", DixType::Standard), Some(Markup::Tag));
        assert_eq!(Markup::from_tag("t", DixType::Standard), None);
        assert_eq!(Markup::from_tag("t", DixType::Separable), Some(Markup::AnyTag));
        assert_eq!(Markup::from_tag("e", DixType::Separable), None);
    }
}
