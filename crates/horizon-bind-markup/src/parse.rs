//! Markup parsing.
//!
//! The parser is lenient in the ways HTML authors expect: void
//! elements need no end tag, attributes may be valueless or unquoted, and a
//! stray end tag closes the nearest matching open element (or is ignored).

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{MarkupError, MarkupResult};
use crate::node::{is_void_element, NodeId};
use crate::tree::Tree;

/// Parse `markup` into detached nodes, returning the top-level nodes in order.
pub(crate) fn parse_fragment(tree: &mut Tree, markup: &str, trim: bool) -> MarkupResult<Vec<NodeId>> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(trim);
    config.check_end_names = false;

    let mut top_level = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| MarkupError::malformed(reader.buffer_position() as u64, e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(start) => {
                let (node, tag) = element_from(tree, &start, reader.buffer_position() as u64)?;
                attach(tree, &stack, &mut top_level, node)?;
                if !is_void_element(&tag) {
                    stack.push(node);
                }
            }
            Event::Empty(empty) => {
                let (node, _) = element_from(tree, &empty, reader.buffer_position() as u64)?;
                attach(tree, &stack, &mut top_level, node)?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).to_string();
                if let Some(pos) = stack
                    .iter()
                    .rposition(|&n| tree.tag(n).is_some_and(|t| t.eq_ignore_ascii_case(&name)))
                {
                    stack.truncate(pos);
                } else {
                    tracing::debug!(target: "horizon_bind_markup::parse", %name, "ignoring unmatched end tag");
                }
            }
            Event::Text(text) => {
                let content = text.unescape().map_err(|e| {
                    MarkupError::malformed(reader.buffer_position() as u64, e.to_string())
                })?;
                if !content.is_empty() {
                    let node = tree.create_text(content.to_string());
                    attach(tree, &stack, &mut top_level, node)?;
                }
            }
            Event::CData(cdata) => {
                let content = String::from_utf8_lossy(&cdata).to_string();
                let node = tree.create_text(content);
                attach(tree, &stack, &mut top_level, node)?;
            }
            Event::Comment(comment) => {
                let content = String::from_utf8_lossy(&comment).to_string();
                let node = tree.create_comment(content);
                attach(tree, &stack, &mut top_level, node)?;
            }
            // Declarations, processing instructions and doctypes carry no content.
            _ => {}
        }
    }

    Ok(top_level)
}

fn element_from(tree: &mut Tree, start: &BytesStart<'_>, position: u64) -> MarkupResult<(NodeId, String)> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let node = tree.create_element(tag.clone());
    for attr in start.html_attributes() {
        let attr = attr.map_err(|e| MarkupError::malformed(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| MarkupError::malformed(position, e.to_string()))?
            .to_string();
        tree.set_attribute(node, key, value)?;
    }
    Ok((node, tag))
}

fn attach(tree: &mut Tree, stack: &[NodeId], top_level: &mut Vec<NodeId>, node: NodeId) -> MarkupResult<()> {
    match stack.last() {
        Some(&parent) => tree.append_child(parent, node),
        None => {
            top_level.push(node);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "<ul><li>a</li><li>b</li></ul>", true).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(tree.children(nodes[0]).unwrap().len(), 2);
        assert_eq!(tree.text(nodes[0]).unwrap(), "ab");
    }

    #[test]
    fn void_elements_need_no_end_tag() {
        let mut tree = Tree::new();
        let nodes =
            parse_fragment(&mut tree, r#"<div><input bind-value="name"><span>x</span></div>"#, true)
                .unwrap();
        let div = nodes[0];
        let children = tree.children(div).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.tag(children[0]), Some("input"));
        assert_eq!(tree.attribute(children[0], "bind-value"), Some("name"));
        assert_eq!(tree.tag(children[1]), Some("span"));
    }

    #[test]
    fn valueless_attributes() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "<li hidden>x</li>", true).unwrap();
        assert!(tree.is_hidden(nodes[0]));
    }

    #[test]
    fn multiple_top_level_nodes() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "<b>1</b><i>2</i>", true).unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn text_only_fragment() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "plain &amp; simple", true).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(tree.text(nodes[0]).unwrap(), "plain & simple");
    }
}
