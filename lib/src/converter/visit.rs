use roxmltree::{Document, Node};

pub trait XmlVisitor {
    fn visit(&mut self, node: Node);
}

/// Containers whose paths are never drawn where they are declared
const NON_RENDERING: [&str; 5] = ["defs", "clipPath", "mask", "symbol", "marker"];

pub fn is_valid_node(node: &Node) -> bool {
    node.is_element()
        && !NON_RENDERING.contains(&node.tag_name().name())
        && node.attribute("display") != Some("none")
        && !node
            .attribute("style")
            .unwrap_or_default()
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .any(|(property, value)| {
                let value = value.trim();
                let value = value.strip_suffix("!important").unwrap_or(value);
                property.trim() == "display" && value.trim_end().eq_ignore_ascii_case("none")
            })
}

pub fn depth_first_visit(doc: &Document, visitor: &mut impl XmlVisitor) {
    let mut stack = doc
        .root()
        .children()
        .rev()
        .filter(|x| is_valid_node(x))
        .collect::<Vec<_>>();
    while let Some(node) = stack.pop() {
        visitor.visit(node);
        stack.extend(node.children().rev().filter(|x| is_valid_node(x)));
    }
}
