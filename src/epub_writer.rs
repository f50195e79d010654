//! One EPUB per book, packaged with `epub-builder`.
//!
//! The reading order is the inline navigation page, a short section page for
//! the book, then every chapter in TOC order.
//!
//! The section page (`book.xhtml`) is there on purpose. epub-builder only
//! attaches table-of-contents entries to a content document, so the single
//! `Book <n>` section that nests every chapter in the navigation needs a page
//! of its own. It holds nothing but the section heading.
//!
//! epub-builder reports failures as `eyre::Report`, which does not implement
//! `std::error::Error`; every call converts the report into an `anyhow` error.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use epub_builder::{
    EpubBuilder, EpubContent, EpubVersion, ReferenceType, TocElement, ZipLibrary,
};

use crate::config::EpubOptions;
use crate::models::ChapterContent;

#[derive(Debug, Clone)]
pub struct CoverImage {
    pub file_name: String,
    pub data: Vec<u8>,
    pub mime: &'static str,
}

impl CoverImage {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| anyhow!("Failed to read cover image: {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "cover-image".to_string());

        Ok(Self {
            file_name,
            data,
            mime: mime_from_path(path),
        })
    }
}

fn mime_from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn xhtml_page(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="en">
<head>
    <meta charset="UTF-8"/>
    <title>{title}</title>
</head>
<body>
{body}</body>
</html>"#,
        title = html_escape::encode_text(title),
        body = body,
    )
}

pub fn chapter_file_name(index: usize) -> String {
    format!("chapter_{:04}.xhtml", index)
}

/// Packages the chapters of book `number` and returns the EPUB bytes.
pub fn build_book(
    number: usize,
    chapters: &[ChapterContent],
    options: &EpubOptions,
    cover: Option<&CoverImage>,
) -> Result<Vec<u8>> {
    let zip =
        ZipLibrary::new().map_err(|e| anyhow!("Failed to create ZIP library for EPUB: {}", e))?;
    let mut builder =
        EpubBuilder::new(zip).map_err(|e| anyhow!("Failed to create EPUB builder: {}", e))?;
    builder.epub_version(EpubVersion::V30);

    let title = options.book_title(number);
    builder
        .metadata("title", &title)
        .map_err(|e| anyhow!("Failed to set title metadata: {}", e))?;
    builder
        .metadata("author", &options.author)
        .map_err(|e| anyhow!("Failed to set author metadata: {}", e))?;
    builder
        .metadata("lang", "en")
        .map_err(|e| anyhow!("Failed to set language metadata: {}", e))?;
    builder
        .metadata("generator", "novel2book")
        .map_err(|e| anyhow!("Failed to set generator metadata: {}", e))?;

    if let Some(cover) = cover {
        builder
            .add_cover_image(&cover.file_name, cover.data.as_slice(), cover.mime)
            .map_err(|e| anyhow!("Failed to add cover image: {}: {}", cover.file_name, e))?;
    }

    builder.inline_toc();

    let section_title = format!("Book {}", number);
    let section_html = xhtml_page(
        &title,
        &format!("<h1>{}</h1>\n", html_escape::encode_text(&section_title)),
    );
    let mut section = EpubContent::new("book.xhtml", section_html.as_bytes())
        .title(section_title.as_str())
        .reftype(ReferenceType::TitlePage);
    for (i, chapter) in chapters.iter().enumerate() {
        section = section.child(TocElement::new(chapter_file_name(i + 1), chapter.title.as_str()));
    }
    builder
        .add_content(section)
        .map_err(|e| anyhow!("Failed to add book section page: {}", e))?;

    for (i, chapter) in chapters.iter().enumerate() {
        let file_name = chapter_file_name(i + 1);
        let html = xhtml_page(&chapter.title, &chapter.to_xhtml());
        let content = EpubContent::new(file_name.as_str(), html.as_bytes());
        let content = if i == 0 {
            content.reftype(ReferenceType::Text)
        } else {
            content
        };
        builder
            .add_content(content)
            .map_err(|e| anyhow!("Failed to add chapter to EPUB: {}: {}", chapter.title, e))?;
    }

    let mut data = Vec::new();
    builder
        .generate(&mut data)
        .map_err(|e| anyhow!("Failed to generate EPUB \"{}\": {}", title, e))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::models::Paragraph;

    fn chapters() -> Vec<ChapterContent> {
        vec![
            ChapterContent {
                title: "Book 1 — Prologue".to_string(),
                paragraphs: vec![Paragraph::plain("Once upon a time.")],
            },
            ChapterContent {
                title: "Book 1 — Chapter 1: Knife".to_string(),
                paragraphs: vec![Paragraph::plain("Black & Red.")],
            },
        ]
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn packages_every_chapter() {
        let data = build_book(1, &chapters(), &EpubOptions::default(), None).unwrap();
        assert_eq!(&data[..2], b"PK");
        assert!(contains(&data, "mimetype"));
        assert!(contains(&data, "book.xhtml"));
        assert!(contains(&data, "chapter_0001.xhtml"));
        assert!(contains(&data, "chapter_0002.xhtml"));
        assert!(!contains(&data, "chapter_0003.xhtml"));
    }

    fn read_entry(data: &[u8], suffix: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let name = archive
            .file_names()
            .find(|name| name.ends_with(suffix))
            .map(str::to_string)
            .unwrap();
        let mut text = String::new();
        archive.by_name(&name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn section_page_sits_between_navigation_and_chapters() {
        let data = build_book(3, &chapters(), &EpubOptions::default(), None).unwrap();

        let opf = read_entry(&data, "content.opf");
        let section = opf.find("book.xhtml").unwrap();
        let first = opf.find("chapter_0001.xhtml").unwrap();
        let second = opf.find("chapter_0002.xhtml").unwrap();
        assert!(section < first && first < second);

        let section_page = read_entry(&data, "book.xhtml");
        assert!(section_page.contains("<h1>Book 3</h1>"));
        let chapter = read_entry(&data, "chapter_0002.xhtml");
        assert!(chapter.contains("<p>Black &amp; Red.</p>"));
    }

    #[test]
    fn embeds_cover_image() {
        let cover = CoverImage {
            file_name: "front.png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
            mime: "image/png",
        };
        let data = build_book(2, &chapters(), &EpubOptions::default(), Some(&cover)).unwrap();
        assert!(contains(&data, "front.png"));
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(mime_from_path(Path::new("cover.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("cover")), "application/octet-stream");
    }
}
