//! Parsed-markup view of a damage formula via the tree-sitter HTML grammar.
//!
//! Two passes: [`strip_precision`] unwraps precision-damage spans and drops
//! their icons, then [`segments`] enumerates the top-level elements of the
//! cleaned fragment. Both operate on nodes; text is copied byte-for-byte
//! between the nodes they touch.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;

/// Deepest node nesting the precision pass walks before rejecting the formula.
const MAX_MARKUP_DEPTH: usize = 256;

/// Class on the span that wraps precision damage.
const PRECISION_CLASS: &str = "precision";

/// Icon class injected next to precision damage.
const PRECISION_ICON: &str = "fa-crosshairs";

/// One top-level element of a cleaned formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSegment {
    /// Text between the end of the start tag and the next markup, trimmed.
    pub damage_text: String,
    /// The element's full markup, start tag through end tag.
    pub markup: String,
}

/// What the precision pre-pass does with a node.
enum NodeAction {
    /// Remove the node and everything inside it.
    Drop,
    /// Copy the node through, recursing into its children.
    Keep,
    /// Remove the node's own tags but keep its content.
    Unwrap,
}

/// Look up the value of an attribute node, quoted or bare.
fn attribute_value<'s>(attribute: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut cursor = attribute.walk();
    for child in attribute.children(&mut cursor) {
        match child.kind() {
            "attribute_value" => return Some(node_text(child, source)),
            "quoted_attribute_value" => {
                let mut inner = child.walk();
                let value = child
                    .children(&mut inner)
                    .find(|c| return c.kind() == "attribute_value")
                    .map(|c| return node_text(c, source));
                return Some(value.unwrap_or(""));
            },
            _ => {},
        }
    }
    return None;
}

/// Decide how the precision pre-pass treats this node.
fn classify_for_precision(node: Node<'_>, source: &str) -> NodeAction {
    if node.kind() != "element" {
        return NodeAction::Keep;
    }

    let Some(tag) = element_tag_name(node, source) else {
        return NodeAction::Keep;
    };
    let classes = element_classes(node, source);

    if tag.eq_ignore_ascii_case("span") && classes.contains(&PRECISION_CLASS) {
        return NodeAction::Unwrap;
    }
    if tag.eq_ignore_ascii_case("i") && classes.contains(&PRECISION_ICON) {
        return NodeAction::Drop;
    }
    return NodeAction::Keep;
}

/// Whitespace-separated class names from an element's start tag.
fn element_classes<'s>(element: Node<'_>, source: &'s str) -> Vec<&'s str> {
    let Some(start_tag) = opening_tag(element) else {
        return Vec::new();
    };

    let mut cursor = start_tag.walk();
    for attribute in start_tag.children(&mut cursor) {
        if attribute.kind() != "attribute" {
            continue;
        }
        let mut name_cursor = attribute.walk();
        let is_class = attribute
            .children(&mut name_cursor)
            .any(|c| return c.kind() == "attribute_name" && node_text(c, source).eq_ignore_ascii_case("class"));
        if !is_class {
            continue;
        }
        return attribute_value(attribute, source)
            .map(|value| return value.split_whitespace().collect())
            .unwrap_or_default();
    }
    return Vec::new();
}

/// The tag name of an element, read from its start tag.
fn element_tag_name<'s>(element: Node<'_>, source: &'s str) -> Option<&'s str> {
    let start_tag = opening_tag(element)?;
    let mut cursor = start_tag.walk();
    return start_tag
        .children(&mut cursor)
        .find(|c| return c.kind() == "tag_name")
        .map(|c| return node_text(c, source));
}

/// Build the segment view of one top-level element.
/// A self-closing element is a segment with no damage text.
/// Returns `None` for an element without an opening tag (error-recovery debris).
fn markup_segment(element: Node<'_>, source: &str) -> Option<MarkupSegment> {
    let mut cursor = element.walk();
    let children: Vec<Node<'_>> = element.children(&mut cursor).collect();
    let (first, rest) = children.split_first()?;
    if !matches!(first.kind(), "start_tag" | "self_closing_tag") {
        return None;
    }

    // Untyped damage has no markup after its text; the text runs to the end.
    let text_end = rest
        .iter()
        .find(|c| return !matches!(c.kind(), "text" | "entity"))
        .map_or(element.end_byte(), |c| return c.start_byte());

    return Some(MarkupSegment {
        damage_text: slice(source, first.end_byte(), text_end).trim().to_string(),
        markup: node_text(element, source).to_string(),
    });
}

/// Source text covered by a node.
fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    return slice(source, node.start_byte(), node.end_byte());
}

/// The `start_tag` or `self_closing_tag` child of an element, if it has one.
fn opening_tag(element: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = element.walk();
    return element
        .children(&mut cursor)
        .find(|c| return matches!(c.kind(), "start_tag" | "self_closing_tag"));
}

/// Parse a formula fragment into an HTML tree.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` if the grammar cannot be loaded or parsing fails.
fn parse_markup(source: &str) -> Result<Tree, Error> {
    let language: Language = tree_sitter_html::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|err| return Error::MarkupParseFailed { reason: err.to_string() })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::MarkupParseFailed {
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

/// Enumerate the damage segments of a cleaned formula: one per top-level element.
/// Top-level text outside any element is separator debris and is skipped.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` if the fragment cannot be parsed.
pub fn segments(cleaned: &str) -> Result<Vec<MarkupSegment>, Error> {
    let tree = parse_markup(cleaned)?;
    let root = tree.root_node();

    let mut cursor = root.walk();
    let found = root
        .children(&mut cursor)
        .filter(|node| return node.kind() == "element")
        .filter_map(|element| return markup_segment(element, cleaned))
        .collect();

    return Ok(found);
}

/// Byte range of `source`, empty if the range is not on char boundaries.
fn slice(source: &str, start: usize, end: usize) -> &str {
    return source.get(start..end).unwrap_or("");
}

/// Remove precision-damage markup: every `span.precision` is replaced by its
/// content and every `i.fa-crosshairs` icon is removed. All other bytes are
/// preserved exactly.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` if the formula cannot be parsed or is
/// nested deeper than the walk accepts.
pub fn strip_precision(formula: &str) -> Result<String, Error> {
    let tree = parse_markup(formula)?;
    let root = tree.root_node();

    let mut cleaned = String::with_capacity(formula.len());
    cleaned.push_str(slice(formula, 0, root.start_byte()));
    write_without_precision(root, formula, &mut cleaned, 0)?;
    cleaned.push_str(slice(formula, root.end_byte(), formula.len()));
    return Ok(cleaned);
}

/// Copy a node's children into `out`, including the bytes between them.
/// With `skip_tags`, the node's own start and end tags are left out.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` past `MAX_MARKUP_DEPTH`.
fn write_children(node: Node<'_>, source: &str, out: &mut String, skip_tags: bool, depth: usize) -> Result<(), Error> {
    let mut position = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        out.push_str(slice(source, position, child.start_byte()));
        position = child.end_byte();
        if skip_tags && matches!(child.kind(), "start_tag" | "end_tag" | "self_closing_tag") {
            continue;
        }
        write_without_precision(child, source, out, depth.saturating_add(1))?;
    }
    out.push_str(slice(source, position, node.end_byte()));
    return Ok(());
}

/// Copy one node into `out`, applying the precision rules recursively.
///
/// # Errors
///
/// Returns `Error::MarkupParseFailed` past `MAX_MARKUP_DEPTH`.
fn write_without_precision(node: Node<'_>, source: &str, out: &mut String, depth: usize) -> Result<(), Error> {
    if depth > MAX_MARKUP_DEPTH {
        return Err(Error::MarkupParseFailed {
            reason: format!("markup nested more than {MAX_MARKUP_DEPTH} levels deep"),
        });
    }

    return match classify_for_precision(node, source) {
        NodeAction::Drop => Ok(()),
        NodeAction::Keep => write_children(node, source, out, false, depth),
        NodeAction::Unwrap => write_children(node, source, out, true, depth),
    };
}
