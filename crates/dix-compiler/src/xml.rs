// Small helpers over the roxmltree document API.

use roxmltree::Node;

use crate::DixError;

/// Attribute value, with an absent attribute read as the empty string.
pub(crate) fn attr<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

/// 1-based source line of `node`.
pub(crate) fn line_of(node: Node<'_, '_>) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

pub(crate) fn tag<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Element children of `node`; text, comments and processing instructions
/// are skipped.
pub(crate) fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

pub(crate) fn unexpected(node: Node<'_, '_>) -> DixError {
    DixError::UnexpectedElement {
        name: tag(node).to_string(),
        line: line_of(node),
    }
}
