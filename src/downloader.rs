use anyhow::{anyhow, Context, Result};
use colored::*;
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{EpubOptions, PdfSettings};
use crate::epub_writer::{self, CoverImage};
use crate::extractor::{ChapterExtractor, ContentStrategy};
use crate::fetcher::Fetch;
use crate::layout::paginate;
use crate::models::{ChapterContent, ChapterLink};
use crate::pdf_writer;
use crate::segmenter::{segment_by_title, Segment};
use crate::toc;
use crate::ScrapeError;

pub struct Downloader<F> {
    fetcher: F,
    out_dir: PathBuf,
    concurrency: usize,
}

impl<F: Fetch> Downloader<F> {
    pub fn new(fetcher: F, out_dir: impl Into<PathBuf>, concurrency: usize) -> Self {
        Self {
            fetcher,
            out_dir: out_dir.into(),
            concurrency: concurrency.max(1),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    async fn fetch_toc(&self, toc_url: &str) -> Result<(Url, String)> {
        info!("Visiting \"{}\"", toc_url.green());
        let url = Url::parse(toc_url).map_err(|e| ScrapeError::InvalidUrl(toc_url.to_string(), e))?;
        let html = self.fetcher.fetch(&url).await?;
        Ok((url, html))
    }

    /// Fetches and extracts `links` in order. Chapters that fail are logged
    /// and left out.
    async fn extract_chapters(
        &self,
        links: &[ChapterLink],
        extractor: &ChapterExtractor,
    ) -> Vec<ChapterContent> {
        stream::iter(links)
            .map(|link| self.extract_chapter(link, extractor))
            .buffered(self.concurrency)
            .filter_map(|chapter| async move { chapter })
            .collect()
            .await
    }

    async fn extract_chapter(
        &self,
        link: &ChapterLink,
        extractor: &ChapterExtractor,
    ) -> Option<ChapterContent> {
        let result = match self.fetcher.fetch(&link.url).await {
            Ok(html) => extractor.extract(&html, &link.title, &link.url),
            Err(e) => Err(e),
        };

        match result {
            Ok(chapter) => {
                info!("{} {}", link.title, "OK!".green());
                Some(chapter)
            }
            Err(e) => {
                warn!("Skipping \"{}\": {}", link.title, e);
                None
            }
        }
    }

    async fn write_file(&self, file_name: &str, data: Vec<u8>) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| anyhow!("Failed to create output directory: {}", e))?;
        let path = self.out_dir.join(file_name);
        fs::write(&path, data)
            .await
            .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
        info!("Saved {}", path.display().to_string().blue());
        Ok(path)
    }

    /// Scrapes a book-grouped TOC and writes one EPUB per book that ended up
    /// with at least one chapter.
    pub async fn run_epub(&self, toc_url: &str, options: &EpubOptions) -> Result<Vec<PathBuf>> {
        let cover = options
            .cover
            .as_deref()
            .map(CoverImage::load)
            .transpose()?;

        let (url, html) = self.fetch_toc(toc_url).await?;
        let books = toc::parse_books(&html, &url)?;
        if books.iter().all(|book| book.links.is_empty()) {
            return Err(ScrapeError::EmptyToc {
                url: url.to_string(),
            }
            .into());
        }

        let extractor = ChapterExtractor::new(ContentStrategy::epub());
        let mut written = Vec::new();

        for book in &books {
            debug!(
                "Book {} ({}) lists {} chapters",
                book.number,
                book.title.as_deref().unwrap_or("untitled"),
                book.links.len()
            );
            let chapters = self.extract_chapters(&book.links, &extractor).await;
            if chapters.is_empty() {
                if !book.links.is_empty() {
                    warn!("No chapter of book {} could be extracted", book.number);
                }
                continue;
            }

            info!("Generating EPUB for book {}...", book.number);
            let data = epub_writer::build_book(book.number, &chapters, options, cover.as_ref())?;
            let file_name = format!("{}.epub", options.book_title(book.number));
            written.push(self.write_file(&file_name, data).await?);
        }

        info!("{} EPUB files have been generated", written.len());
        Ok(written)
    }

    /// Scrapes a TOC of chapter-titled links, splits it into segments and
    /// extracts every chapter. Segments whose chapters all failed are dropped.
    pub async fn collect_segments(&self, toc_url: &str) -> Result<Vec<Segment<ChapterContent>>> {
        let (url, html) = self.fetch_toc(toc_url).await?;
        let links = toc::parse_chapter_links(&html, &url);
        if links.is_empty() {
            return Err(ScrapeError::EmptyToc {
                url: url.to_string(),
            }
            .into());
        }

        let segments = segment_by_title(links, |link| link.title.as_str());
        info!(
            "Found {} chapters in {} segments",
            segments.iter().map(|s| s.items.len()).sum::<usize>(),
            segments.len()
        );

        let extractor = ChapterExtractor::new(ContentStrategy::pdf());
        let mut collected = Vec::new();
        for segment in segments {
            let chapters = self.extract_chapters(&segment.items, &extractor).await;
            if chapters.is_empty() {
                warn!("No chapter of part {} could be extracted", segment.number);
                continue;
            }
            collected.push(Segment {
                number: segment.number,
                items: chapters,
            });
        }

        Ok(collected)
    }

    /// Writes `novel_part_<n>.pdf` for every segment.
    pub async fn write_pdfs(
        &self,
        segments: &[Segment<ChapterContent>],
        settings: &PdfSettings,
    ) -> Result<Vec<PathBuf>> {
        settings.validate()?;

        let mut written = Vec::new();
        for segment in segments {
            let file_name = format!("novel_part_{}.pdf", segment.number);
            let pages = paginate(&segment.items, settings);
            info!(
                "Laying out part {} on {} pages",
                segment.number,
                pages.len()
            );
            let data = pdf_writer::render_to_vec(&pages, settings, &file_name)
                .with_context(|| format!("Failed to render part {}", segment.number))?;
            written.push(self.write_file(&file_name, data).await?);
        }

        info!("{} PDF files have been generated", written.len());
        Ok(written)
    }
}

/// Human readable listing of segments, one `Book <n>:` block each.
pub fn describe_segments(segments: &[Segment<ChapterContent>]) -> String {
    let mut listing = String::new();
    for segment in segments {
        listing.push_str(&format!("\nBook {}:\n", segment.number));
        for chapter in &segment.items {
            listing.push_str(&format!("  -> {}\n", chapter.title));
        }
    }
    listing
}
