use std::future::Future;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::ScrapeError;

/// Source of raw HTML. The downloader is generic over this so the whole
/// pipeline can run against canned pages.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, ScrapeError>> + Send;
}

/// Plain HTTP GET fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// A timeout of zero disables the request timeout.
    pub fn new(timeout_seconds: f64) -> Result<Self, ScrapeError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("novel2book/", env!("CARGO_PKG_VERSION")));
        if timeout_seconds > 0.0 {
            builder = builder.timeout(Duration::from_secs_f64(timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|source| ScrapeError::Http {
                url: "(client setup)".to_string(),
                source,
            })?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let http_error = |source| ScrapeError::Http {
            url: url.to_string(),
            source,
        };

        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_error)?
            .error_for_status()
            .map_err(http_error)?;

        response.text().await.map_err(http_error)
    }
}
