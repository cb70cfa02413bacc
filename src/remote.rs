/// Remote image-search client
///
/// One HTTP round trip per call to a fixed search endpoint. The endpoint
/// returns a JSON array with a single random image; only index 0 is
/// consumed and any extra elements are discarded.

use crate::error::AppError;
use crate::state::data::CatImage;

/// The fixed search endpoint. Every GET returns one random image.
const SEARCH_URL: &str = "https://api.thecatapi.com/v1/images/search";

/// HTTP client for the image search API.
///
/// No retry and no explicit timeout; a failed call is reported to the
/// caller and retried only on user request.
#[derive(Debug, Clone)]
pub struct CatApiClient {
    http: reqwest::Client,
}

impl CatApiClient {
    pub fn new() -> Self {
        CatApiClient {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch one random image descriptor from the search endpoint.
    pub async fn fetch_one(&self) -> Result<CatImage, AppError> {
        let response = self.http.get(SEARCH_URL).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "search request failed with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }

    /// Download the raw bytes of an image, for the on-disk media cache.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl Default for CatApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the search response body into the first returned descriptor.
fn parse_search_response(body: &str) -> Result<CatImage, AppError> {
    let images: Vec<CatImage> = serde_json::from_str(body)?;

    images
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Fetch("search returned an empty result".into()))
}
