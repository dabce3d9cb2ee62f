use ego_tree::NodeRef;
use scraper::node::{Element, Node};
use scraper::{Html, Selector};

/// id/class of the floating button the extension injects into pages.
pub const EXTENSION_CHROME_MARKER: &str = "quiz-generator-button-container";

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "img", "video", "audio", "iframe", "canvas", "template",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Produces a plain-text snapshot of a document.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, html: &str) -> String;
}

/// Collects the text a reader would see in `<body>`:
/// - drops scripts, styles, media and embedded frames
/// - drops dialogs and the extension's own button
/// - separates block elements and collapses every whitespace run to one space.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibleTextExtractor;

impl TextExtractor for VisibleTextExtractor {
    fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let body = Selector::parse("body")
            .ok()
            .and_then(|sel| document.select(&sel).next());

        let mut buffer = TextBuffer::default();
        match body {
            Some(body) => visit_children(*body, &mut buffer),
            None => visit_children(*document.root_element(), &mut buffer),
        }
        buffer.finish()
    }
}

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut buffer = TextBuffer::default();
    buffer.push_text(text);
    buffer.finish()
}

fn visit_node(node: NodeRef<'_, Node>, buffer: &mut TextBuffer) {
    match node.value() {
        Node::Text(text) => buffer.push_text(text),
        Node::Element(element) => {
            if is_hidden(element) {
                return;
            }
            let block = has_tag(BLOCK_TAGS, element);
            if block {
                buffer.separate();
            }
            visit_children(node, buffer);
            if block {
                buffer.separate();
            }
        }
        Node::Document | Node::Fragment => visit_children(node, buffer),
        _ => {}
    }
}

fn visit_children(node: NodeRef<'_, Node>, buffer: &mut TextBuffer) {
    for child in node.children() {
        visit_node(child, buffer);
    }
}

fn is_hidden(element: &Element) -> bool {
    if has_tag(SKIPPED_TAGS, element) {
        return true;
    }
    if element
        .attr("role")
        .is_some_and(|role| role.eq_ignore_ascii_case("dialog"))
    {
        return true;
    }
    element.id() == Some(EXTENSION_CHROME_MARKER)
        || element.classes().any(|class| class == EXTENSION_CHROME_MARKER)
}

fn has_tag(tags: &[&str], element: &Element) -> bool {
    let name = element.name();
    tags.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

#[derive(Default)]
struct TextBuffer {
    text: String,
    pending_space: bool,
}

impl TextBuffer {
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if self.pending_space && !self.text.is_empty() {
                self.text.push(' ');
            }
            self.pending_space = false;
            self.text.push(ch);
        }
    }

    fn separate(&mut self) {
        self.pending_space = true;
    }

    fn finish(self) -> String {
        self.text
    }
}
