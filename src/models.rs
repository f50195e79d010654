use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLink {
    pub title: String,
    pub url: Url,
}

/// A group of chapters introduced by one heading of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub number: usize,
    /// Heading text, `None` for chapters listed before the first heading.
    pub title: Option<String>,
    pub links: Vec<ChapterLink>,
}

/// One block of chapter text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// XHTML element the block is written as: `p`, `h3`..`h6` or `blockquote`.
    pub tag: &'static str,
    /// Plain text with whitespace collapsed.
    pub text: String,
    /// Escaped inline markup; keeps `<em>` and `<strong>`.
    pub xhtml: String,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            tag: "p",
            xhtml: html_escape::encode_text(&text).into_owned(),
            text,
        }
    }
}

/// Readable text of one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

impl ChapterContent {
    pub fn body_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|paragraph| paragraph.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// XHTML fragment: the title as `<h2>` followed by one element per block.
    pub fn to_xhtml(&self) -> String {
        let mut html = format!("<h2>{}</h2>\n", html_escape::encode_text(&self.title));
        for paragraph in &self.paragraphs {
            html.push_str(&format!(
                "<{tag}>{}</{tag}>\n",
                paragraph.xhtml,
                tag = paragraph.tag
            ));
        }
        html
    }
}
