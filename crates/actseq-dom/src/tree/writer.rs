//! XML text rendering.

use super::{NodeId, TextContent, TreeData};

const INDENT: &str = "  ";

pub(super) fn write_node(data: &TreeData, id: NodeId, depth: usize, out: &mut String) {
    let node = data.node(id);
    let indent = INDENT.repeat(depth);

    out.push_str(&indent);
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }

    if node.children.is_empty() && node.text.is_none() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');

    if let Some(text) = &node.text {
        write_text(text, out);
    }

    if node.children.is_empty() {
        out.push_str("</");
        out.push_str(&node.name);
        out.push_str(">\n");
        return;
    }

    out.push('\n');
    for child in &node.children {
        write_node(data, *child, depth + 1, out);
    }
    out.push_str(&indent);
    out.push_str("</");
    out.push_str(&node.name);
    out.push_str(">\n");
}

fn write_text(text: &TextContent, out: &mut String) {
    match text {
        TextContent::Plain(value) => out.push_str(&escape(value, false)),
        TextContent::CData(value) => {
            out.push_str("<![CDATA[");
            // a literal "]]>" has to be split over two sections
            out.push_str(&value.replace("]]>", "]]]]><![CDATA[>"));
            out.push_str("]]>");
        }
    }
}

fn escape(value: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use crate::tree::XmlTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_nested_document() {
        let tree = XmlTree::new("action-sequence");
        let root = tree.root().unwrap();
        root.add_child("title").set_text("Fish & Chips");
        let input = root.ensure_path("inputs/custID");
        input.set_attribute("type", "integer");
        root.add_child("condition").set_cdata("a < b ]]> c");

        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<action-sequence>
  <title>Fish &amp; Chips</title>
  <inputs>
    <custID type="integer"/>
  </inputs>
  <condition><![CDATA[a < b ]]]]><![CDATA[> c]]></condition>
</action-sequence>
"#;
        assert_eq!(tree.to_xml(), expected);
    }

    #[test]
    fn test_attribute_quotes_are_escaped() {
        let tree = XmlTree::new("root");
        let root = tree.root().unwrap();
        root.set_attribute("expr", "say \"hi\"");
        assert_eq!(root.to_xml(), "<root expr=\"say &quot;hi&quot;\"/>\n");
    }
}
