//! Table-of-contents parsing.
//!
//! Two page shapes are understood: a WordPress style post whose content
//! container alternates `h2` book headings with chapter lists (EPUB path), and
//! any page whose chapter links are recognisable by their text alone (PDF
//! path).

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::extractor::{element_text, ContentStrategy};
use crate::models::{Book, ChapterLink};
use crate::ScrapeError;

static CHAPTER_LINK_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Chapter \d+|Prologue|Epilogue)\b").unwrap());

static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

/// Containers tried, in order, for the book/chapter listing.
pub fn toc_container_strategy() -> ContentStrategy {
    ContentStrategy::new(&["div.entry-content", "div.post-content"])
}

/// Groups the chapter links of a TOC page into books.
///
/// Each `h2` directly under the content container opens a new book and its
/// text prefixes the titles of the chapters that follow. Lists found before
/// the first heading go to an untitled book 1.
pub fn parse_books(html: &str, base_url: &Url) -> Result<Vec<Book>, ScrapeError> {
    let document = Html::parse_document(html);
    let container = toc_container_strategy()
        .find(&document)
        .ok_or_else(|| ScrapeError::TocContainerNotFound {
            url: base_url.to_string(),
        })?;

    let mut books: Vec<Book> = Vec::new();
    let mut prefix = String::new();

    for child in container.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "h2" => {
                let heading = element_text(&child);
                prefix = format!("{} — ", heading);
                books.push(Book {
                    number: books.len() + 1,
                    title: Some(heading),
                    links: Vec::new(),
                });
            }
            "ul" | "ol" => {
                if books.is_empty() {
                    books.push(Book {
                        number: 1,
                        title: None,
                        links: Vec::new(),
                    });
                }
                let links = list_links(&child, &prefix, base_url);
                if let Some(book) = books.last_mut() {
                    book.links.extend(links);
                }
            }
            _ => {}
        }
    }

    debug!(
        "Parsed {} books with {} chapters",
        books.len(),
        books.iter().map(|b| b.links.len()).sum::<usize>()
    );
    Ok(books)
}

fn list_links(list: &ElementRef<'_>, prefix: &str, base_url: &Url) -> Vec<ChapterLink> {
    let mut links = Vec::new();

    for item in list.select(&LIST_ITEM) {
        // Some TOC pages carry empty styling <li> elements between chapters.
        if element_text(&item).is_empty() {
            continue;
        }
        let Some(anchor) = item.select(&LINK).next() else {
            continue;
        };
        if let Some(link) = make_link(&anchor, prefix, base_url) {
            links.push(link);
        }
    }

    links
}

/// Collects every link whose text names a chapter, prologue or epilogue, in
/// document order.
pub fn parse_chapter_links(html: &str, base_url: &Url) -> Vec<ChapterLink> {
    let document = Html::parse_document(html);

    let links: Vec<ChapterLink> = document
        .select(&LINK)
        .filter(|anchor| CHAPTER_LINK_TEXT.is_match(&element_text(anchor)))
        .filter_map(|anchor| make_link(&anchor, "", base_url))
        .collect();

    debug!("Collected {} chapter links", links.len());
    links
}

fn make_link(anchor: &ElementRef<'_>, prefix: &str, base_url: &Url) -> Option<ChapterLink> {
    let href = anchor.value().attr("href")?;
    match base_url.join(href) {
        Ok(url) => Some(ChapterLink {
            title: format!("{}{}", prefix, element_text(anchor)),
            url,
        }),
        Err(e) => {
            warn!("Ignoring unresolvable link \"{}\": {}", href, e);
            None
        }
    }
}
