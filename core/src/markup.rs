use ego_tree::iter::Edge;
use scraper::{Html, Node};

const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];
const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "td", "th", "title", "tr", "ul",
];

fn element_in(node: &Node, names: &[&str]) -> bool {
    node.as_element().is_some_and(|e| names.contains(&e.name()))
}

/// Plain-text rendering of an HTML document: visible text with whitespace
/// runs collapsed to one space. Opening and closing block elements both act
/// as word breaks.
pub fn strip_markup(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::with_capacity(html.len() / 2);
    let mut pending_space = false;
    let mut hidden_depth = 0usize;
    for edge in doc.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                n if element_in(n, HIDDEN) => hidden_depth += 1,
                n if element_in(n, BLOCK) => pending_space = true,
                Node::Text(text) if hidden_depth == 0 => {
                    for c in text.chars() {
                        if c.is_whitespace() {
                            pending_space = true;
                            continue;
                        }
                        if pending_space && !out.is_empty() {
                            out.push(' ');
                        }
                        pending_space = false;
                        out.push(c);
                    }
                }
                _ => {}
            },
            Edge::Close(node) => match node.value() {
                n if element_in(n, HIDDEN) => hidden_depth = hidden_depth.saturating_sub(1),
                n if element_in(n, BLOCK) => pending_space = true,
                _ => {}
            },
        }
    }
    out
}
