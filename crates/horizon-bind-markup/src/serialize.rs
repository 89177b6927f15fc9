//! Markup serialization.

use quick_xml::escape::escape;

use crate::error::MarkupResult;
use crate::node::{is_void_element, NodeId, NodeKind};
use crate::tree::Tree;

/// Serialize a node and its subtree.
pub(crate) fn outer_markup(tree: &Tree, id: NodeId) -> MarkupResult<String> {
    let mut out = String::new();
    write_node(tree, id, &mut out)?;
    Ok(out)
}

/// Serialize the children of a node.
pub(crate) fn inner_markup(tree: &Tree, id: NodeId) -> MarkupResult<String> {
    let mut out = String::new();
    for &child in tree.children(id)? {
        write_node(tree, child, &mut out)?;
    }
    Ok(out)
}

enum Step<'a> {
    Enter(NodeId),
    Close(&'a str),
}

fn write_node<'a>(tree: &'a Tree, id: NodeId, out: &mut String) -> MarkupResult<()> {
    let mut stack = vec![Step::Enter(id)];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Enter(id) => id,
            Step::Close(tag) => {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                continue;
            }
        };
        match tree.kind(id)? {
            NodeKind::Document => {
                stack.extend(tree.children(id)?.iter().rev().map(|&child| Step::Enter(child)));
            }
            NodeKind::Text(text) => out.push_str(&escape(text.as_str())),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape(value.as_str()));
                        out.push('"');
                    }
                }
                let children = tree.children(id)?;
                if children.is_empty() && is_void_element(tag) {
                    out.push_str("/>");
                    continue;
                }
                out.push('>');
                stack.push(Step::Close(tag));
                stack.extend(children.iter().rev().map(|&child| Step::Enter(child)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_fragment;

    #[test]
    fn serializes_attributes_and_text() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, r#"<p class="a">x &lt; y</p>"#, true).unwrap();
        assert_eq!(outer_markup(&tree, nodes[0]).unwrap(), r#"<p class="a">x &lt; y</p>"#);
    }

    #[test]
    fn valueless_attribute_and_void_element() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "<div hidden><br></div>", true).unwrap();
        assert_eq!(outer_markup(&tree, nodes[0]).unwrap(), "<div hidden><br/></div>");
        assert_eq!(inner_markup(&tree, nodes[0]).unwrap(), "<br/>");
    }

    #[test]
    fn nested_elements_close_in_order() {
        let mut tree = Tree::new();
        let markup = "<ul><li>a<b>b</b></li><li>c</li></ul><p>d</p>";
        let nodes = parse_fragment(&mut tree, markup, true).unwrap();
        let out: String = nodes
            .iter()
            .map(|&n| outer_markup(&tree, n).unwrap())
            .collect();
        assert_eq!(out, markup);
    }
}
