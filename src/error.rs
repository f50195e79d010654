use thiserror::Error;

/// Failures while fetching or scraping a single unit of work (the TOC page or
/// one chapter).
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid URL \"{0}\": {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("no table of contents container found at {url}")]
    TocContainerNotFound { url: String },

    #[error("no chapter content found at {url}")]
    ContentNotFound { url: String },

    #[error("table of contents at {url} lists no chapters")]
    EmptyToc { url: String },
}
