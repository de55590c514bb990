use serde::Deserialize;
use serde_json::Value;

#[cfg(feature = "download_data")]
pub mod fetch;

pub use super::error::Result;

/// One page of the paginated dataset.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Rows exactly as delivered; non-object entries are rejected later by
    /// the normalizer instead of failing the page.
    pub rows: Vec<Value>,
    /// Total number of rows the source claims to hold, if it reports one.
    pub total: Option<usize>,
}

impl Page {
    /// Decode the `{"result": {"count": .., "results": [..]}}` envelope.
    ///
    /// A body without a `result` object decodes to an empty page.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let envelope: DatasetEnvelope = serde_json::from_slice(body)?;
        Ok(envelope.into())
    }
}

#[derive(Debug, Deserialize)]
struct DatasetEnvelope {
    #[serde(default)]
    result: Option<DatasetPayload>,
}

#[derive(Debug, Deserialize)]
struct DatasetPayload {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    results: Vec<Value>,
}

impl From<DatasetEnvelope> for Page {
    fn from(envelope: DatasetEnvelope) -> Self {
        envelope
            .result
            .map(|payload| Self {
                rows: payload.results,
                total: payload.count,
            })
            .unwrap_or_default()
    }
}

/// Anything that can serve dataset pages by offset and limit.
///
/// The loader only depends on this trait so tests can substitute an in-memory
/// source for the HTTP one.
pub trait PageSource: Send + Sync {
    /// Fetch up to `limit` rows starting at `offset`.
    fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Page>> + Send;
}
