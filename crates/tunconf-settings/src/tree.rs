//! Tree rendering of settings.
//!
//! A [`Node`] holds one line of text and its children. Rendering takes an
//! explicit [`LineStyle`]: each child gets the branch glyph, except the last
//! sibling which gets the leaf glyph, and every nesting level adds one indent
//! unit.

use std::fmt;

pub const DEFAULT_INDENT: &str = "    ";
pub const DEFAULT_BRANCH: &str = "├── ";
pub const DEFAULT_LEAF: &str = "└── ";

/// Prefix glyphs and indentation used when rendering a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStyle {
    /// Indentation added per nesting level.
    pub indent: String,
    /// Prefix for every child except the last.
    pub branch: String,
    /// Prefix for the last child.
    pub leaf: String,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            leaf: DEFAULT_LEAF.to_string(),
        }
    }
}

/// A line of text with nested child lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    text: String,
    children: Vec<Node>,
}

impl Node {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append a child line and return it for further nesting.
    pub fn child(&mut self, text: impl Into<String>) -> &mut Node {
        self.children.push(Node::new(text));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append an already built subtree.
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Render the children only; the node's own text is not emitted.
    pub fn child_lines(&self, style: &LineStyle) -> Vec<String> {
        let mut lines = Vec::new();
        render_children(&self.children, style, 0, &mut lines);
        lines
    }

    /// Render the node's text followed by its children.
    pub fn lines(&self, style: &LineStyle) -> Vec<String> {
        let mut lines = vec![self.text.clone()];
        render_children(&self.children, style, 0, &mut lines);
        lines
    }

    pub fn render(&self, style: &LineStyle) -> String {
        self.lines(style).join("\n")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&LineStyle::default()))
    }
}

fn render_children(children: &[Node], style: &LineStyle, depth: usize, lines: &mut Vec<String>) {
    let indent = style.indent.repeat(depth);
    for (i, child) in children.iter().enumerate() {
        let prefix = if i + 1 == children.len() {
            &style.leaf
        } else {
            &style.branch
        };
        lines.push(format!("{}{}{}", indent, prefix, child.text));
        render_children(&child.children, style, depth + 1, lines);
    }
}

/// `set` / `not set`, without ever exposing the value.
pub fn set_or_not(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "set",
        _ => "not set",
    }
}

/// Bracketed form of [`set_or_not`], used for credentials and blobs.
pub fn redact(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "[set]",
        _ => "[not set]",
    }
}

/// `enabled` / `disabled` / `not set`.
pub fn enabled_or_not(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "enabled",
        Some(false) => "disabled",
        None => "not set",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Node {
        let mut root = Node::new("Root:");
        root.child("a");
        let list = root.child("list:");
        list.child("x");
        list.child("y").child("deep");
        root.child("b");
        root
    }

    #[test]
    fn test_default_style() {
        let lines = sample().lines(&LineStyle::default());
        assert_eq!(
            lines,
            vec![
                "Root:",
                "├── a",
                "├── list:",
                "    ├── x",
                "    └── y",
                "        └── deep",
                "└── b",
            ]
        );
    }

    #[test]
    fn test_custom_style() {
        let style = LineStyle {
            indent: "  ".to_string(),
            branch: "- ".to_string(),
            leaf: "* ".to_string(),
        };
        let lines = sample().child_lines(&style);
        assert_eq!(lines, vec!["- a", "- list:", "  - x", "  * y", "    * deep", "* b"]);
    }

    #[test]
    fn test_single_child_is_leaf() {
        let mut root = Node::new("r");
        root.child("only");
        assert_eq!(root.to_string(), "r\n└── only");
    }

    #[test]
    fn test_redaction_helpers() {
        assert_eq!(set_or_not(None), "not set");
        assert_eq!(set_or_not(Some("")), "not set");
        assert_eq!(set_or_not(Some("secret")), "set");
        assert_eq!(redact(Some("secret")), "[set]");
        assert_eq!(redact(Some("")), "[not set]");
        assert_eq!(enabled_or_not(None), "not set");
    }
}
