//! # novel2book
//!
//! A CLI utility to turn a serialized web novel into books for offline
//! reading.
//!
//! ## Current Features
//!
//! - Table-of-contents scraping, grouped by book headings or by chapter titles
//! - Chapter text extraction with boilerplate removal
//! - One EPUB per book, or one paginated PDF per detected part
//!
//! ## Usage
//!
//! ```bash
//! novel2book epub https://practicalguidetoevil.wordpress.com/table-of-contents/
//! novel2book pdf https://example.com/novel/ --font times --font-size 11
//! ```

pub mod config;
mod downloader;
pub mod epub_writer;
mod error;
pub mod extractor;
pub mod fetcher;
pub mod fonts;
pub mod layout;
pub mod models;
pub mod pdf_writer;
pub mod prompt;
pub mod segmenter;
pub mod toc;

pub use config::{EpubOptions, PdfSettings};
pub use downloader::{describe_segments, Downloader};
pub use error::ScrapeError;
pub use fetcher::{Fetch, HttpFetcher};
pub use fonts::BuiltinFont;
pub use models::{Book, ChapterContent, ChapterLink, Paragraph};
pub use segmenter::Segment;
