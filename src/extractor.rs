use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::models::{ChapterContent, Paragraph};
use crate::ScrapeError;

/// Social-sharing footers injected by the Jetpack WordPress plugin.
const BOILERPLATE_SELECTORS: &[&str] = &["div[id^='jp-post-flair']"];

/// Ordered list of CSS selectors; the first one that matches wins.
#[derive(Debug, Clone)]
pub struct ContentStrategy {
    selectors: Vec<String>,
}

impl ContentStrategy {
    pub fn new(selectors: &[&str]) -> Self {
        Self {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Chapter bodies of book-grouped WordPress serials.
    pub fn epub() -> Self {
        Self::new(&["div.entry-content", "div.post-content", "article"])
    }

    /// Chapter bodies of pages reached through chapter-titled links.
    pub fn pdf() -> Self {
        Self::new(&[
            "div.chapter-content",
            "div.entry-content",
            "div.post-content",
            "article",
        ])
    }

    pub fn find<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        for selector_str in &self.selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    debug!("Content matched selector: {}", selector_str);
                    return Some(element);
                }
            }
        }
        None
    }
}

/// Pulls the readable text of a chapter page.
#[derive(Debug, Clone)]
pub struct ChapterExtractor {
    strategy: ContentStrategy,
}

impl ChapterExtractor {
    pub fn new(strategy: ContentStrategy) -> Self {
        Self { strategy }
    }

    pub fn extract(&self, html: &str, title: &str, url: &Url) -> Result<ChapterContent, ScrapeError> {
        let mut document = Html::parse_document(html);
        strip_boilerplate(&mut document);

        let container = self
            .strategy
            .find(&document)
            .ok_or_else(|| ScrapeError::ContentNotFound {
                url: url.to_string(),
            })?;

        let mut blocks = BlockCollector::default();
        blocks.walk(container);
        let paragraphs = blocks.finish();
        debug!("Extracted {} blocks from {}", paragraphs.len(), url);

        Ok(ChapterContent {
            title: title.to_string(),
            paragraphs,
        })
    }
}

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());

/// Elements whose content never becomes chapter text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that end the current block and start a new one.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "aside", "h1", "h2", "h3", "h4", "h5",
    "h6", "blockquote", "pre", "ul", "ol", "li", "dl", "dt", "dd", "table", "tr", "td", "th",
    "figure", "figcaption", "hr",
];

fn block_tag(name: &str, enclosing: &'static str) -> &'static str {
    match name {
        "h1" | "h2" | "h3" => "h3",
        "h4" => "h4",
        "h5" => "h5",
        "h6" => "h6",
        "blockquote" => "blockquote",
        _ => enclosing,
    }
}

fn emphasis_tag(name: &str) -> Option<&'static str> {
    match name {
        "em" | "i" | "cite" => Some("em"),
        "strong" | "b" => Some("strong"),
        _ => None,
    }
}

/// Walks a container in document order, cutting its text into blocks.
///
/// Emphasis that spans a block boundary is closed at the end of one block
/// and reopened before the next text, so every block's markup is balanced.
struct BlockCollector {
    blocks: Vec<Paragraph>,
    tag: &'static str,
    text: String,
    xhtml: String,
    /// Emphasis elements currently entered.
    emphasis: Vec<&'static str>,
    /// How many of `emphasis` have an open tag in `xhtml`.
    written: usize,
}

impl Default for BlockCollector {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            tag: "p",
            text: String::new(),
            xhtml: String::new(),
            emphasis: Vec::new(),
            written: 0,
        }
    }
}

impl BlockCollector {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.enter(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn enter(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            return;
        }
        if name == "br" {
            self.end_block();
        } else if BLOCK_ELEMENTS.contains(&name) {
            self.end_block();
            let enclosing = self.tag;
            self.tag = block_tag(name, enclosing);
            self.walk(element);
            self.end_block();
            self.tag = enclosing;
        } else if let Some(tag) = emphasis_tag(name) {
            self.emphasis.push(tag);
            self.walk(element);
            if self.written == self.emphasis.len() {
                self.xhtml.push_str(&format!("</{tag}>"));
                self.written -= 1;
            }
            self.emphasis.pop();
        } else {
            self.walk(element);
        }
    }

    /// A blank line inside a text node separates blocks; other whitespace
    /// collapses to one space.
    fn push_text(&mut self, raw: &str) {
        for (i, piece) in BLANK_LINE.split(raw).enumerate() {
            if i > 0 {
                self.end_block();
            }
            self.push_inline(piece);
        }
    }

    fn push_inline(&mut self, raw: &str) {
        let mut collapsed = String::with_capacity(raw.len());
        if raw.starts_with(char::is_whitespace) {
            collapsed.push(' ');
        }
        collapsed.push_str(&raw.split_whitespace().collect::<Vec<_>>().join(" "));
        if raw.ends_with(char::is_whitespace) && !collapsed.trim().is_empty() {
            collapsed.push(' ');
        }

        let piece = if self.text.is_empty() || self.text.ends_with(' ') {
            collapsed.trim_start()
        } else {
            collapsed.as_str()
        };
        if piece.is_empty() {
            return;
        }

        if !piece.trim().is_empty() {
            for tag in &self.emphasis[self.written..] {
                self.xhtml.push_str(&format!("<{tag}>"));
            }
            self.written = self.emphasis.len();
        }
        self.text.push_str(piece);
        self.xhtml.push_str(&html_escape::encode_text(piece));
    }

    fn end_block(&mut self) {
        for tag in self.emphasis[..self.written].iter().rev() {
            self.xhtml.push_str(&format!("</{tag}>"));
        }
        self.written = 0;

        let text = self.text.trim().to_string();
        let xhtml = self.xhtml.trim().to_string();
        self.text.clear();
        self.xhtml.clear();
        if !text.is_empty() {
            self.blocks.push(Paragraph {
                tag: self.tag,
                text,
                xhtml,
            });
        }
    }

    fn finish(mut self) -> Vec<Paragraph> {
        self.end_block();
        self.blocks
    }
}

fn strip_boilerplate(document: &mut Html) {
    let mut ids = Vec::new();
    for selector_str in BOILERPLATE_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            ids.extend(document.select(&selector).map(|element| element.id()));
        }
    }

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Visible text of an element with runs of whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://serial.example.com/2015/04/01/chapter-1/").unwrap()
    }

    fn texts(chapter: &ChapterContent) -> Vec<&str> {
        chapter.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn falls_back_through_selectors() {
        let html = r#"<html><body>
            <article><p>First line.</p><p>  Second
                line. </p><p> </p></article>
        </body></html>"#;
        let chapter = ChapterExtractor::new(ContentStrategy::epub())
            .extract(html, "Chapter 1", &url())
            .unwrap();
        assert_eq!(chapter.title, "Chapter 1");
        assert_eq!(texts(&chapter), vec!["First line.", "Second line."]);
    }

    #[test]
    fn earlier_selector_wins() {
        let html = r#"<body>
            <article><div class="entry-content"><p>Body</p></div><p>Comments</p></article>
        </body>"#;
        let chapter = ChapterExtractor::new(ContentStrategy::epub())
            .extract(html, "Chapter 1", &url())
            .unwrap();
        assert_eq!(texts(&chapter), vec!["Body"]);
    }

    #[test]
    fn strips_sharing_footer() {
        let html = r#"<body><div class="entry-content">
            <p>Text of the chapter.</p>
            <div id="jp-post-flair" class="sharedaddy"><p>Share this: Twitter</p></div>
        </div></body>"#;
        let chapter = ChapterExtractor::new(ContentStrategy::epub())
            .extract(html, "Chapter 1", &url())
            .unwrap();
        assert_eq!(texts(&chapter), vec!["Text of the chapter."]);
    }

    #[test]
    fn splits_plain_text_on_lines() {
        let html = "<body><div class=\"chapter-content\">One.\n\n  Two   words.\n</div></body>";
        let chapter = ChapterExtractor::new(ContentStrategy::pdf())
            .extract(html, "Prologue", &url())
            .unwrap();
        assert_eq!(chapter.body_text(), "One.\nTwo words.");
    }

    #[test]
    fn keeps_every_block_in_document_order() {
        let html = r#"<body><div class="entry-content">
            <p>First.</p><h3>Interlude</h3><blockquote>A letter read aloud.</blockquote>
            <ul><li>Item one</li></ul>Loose text<p>Last.</p>
        </div></body>"#;
        let chapter = ChapterExtractor::new(ContentStrategy::epub())
            .extract(html, "Chapter 2", &url())
            .unwrap();
        assert_eq!(
            texts(&chapter),
            vec!["First.", "Interlude", "A letter read aloud.", "Item one", "Loose text", "Last."]
        );
        let tags: Vec<_> = chapter.paragraphs.iter().map(|p| p.tag).collect();
        assert_eq!(tags, vec!["p", "h3", "blockquote", "p", "p", "p"]);
    }

    #[test]
    fn keeps_inline_emphasis_as_markup() {
        let html = r#"<body><div class="entry-content">
            <p>He <em>did</em> it &amp; <b>won</b>.</p>
            <p><i>Heavy<br>crown</i></p>
            <script>var x = 1;</script>
        </div></body>"#;
        let chapter = ChapterExtractor::new(ContentStrategy::epub())
            .extract(html, "Chapter 3", &url())
            .unwrap();
        assert_eq!(texts(&chapter), vec!["He did it & won.", "Heavy", "crown"]);
        let markup: Vec<_> = chapter.paragraphs.iter().map(|p| p.xhtml.as_str()).collect();
        assert_eq!(
            markup,
            vec![
                "He <em>did</em> it &amp; <strong>won</strong>.",
                "<em>Heavy</em>",
                "<em>crown</em>",
            ]
        );
    }

    #[test]
    fn missing_content_reports_url() {
        let err = ChapterExtractor::new(ContentStrategy::pdf())
            .extract("<body><p>404</p></body>", "Chapter 9", &url())
            .unwrap_err();
        match err {
            ScrapeError::ContentNotFound { url } => assert!(url.ends_with("chapter-1/")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
