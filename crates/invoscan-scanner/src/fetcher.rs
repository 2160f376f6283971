//! Document retrieval and text decoding.
//!
//! The pipeline depends only on [`DocumentFetcher`]; [`HttpDocumentFetcher`]
//! is the production implementation. Turning the downloaded bytes into
//! plain text is part of fetching, so an encrypted or corrupt PDF is a fetch
//! failure rather than an empty document.

use crate::error::FetchError;
use async_trait::async_trait;
use invoscan_core::{DocumentLocation, ScanningConfig};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

const PDF_MAGIC: &[u8] = b"%PDF";

/// One fetched document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Where it came from
    pub location: DocumentLocation,
    /// Size of the downloaded body in bytes
    pub size: usize,
    /// Plain text decoded from the body
    pub text: String,
    /// `Content-Type` reported by the server, if any
    pub content_type: Option<String>,
}

/// Retrieves documents and decodes them to text.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `location`.
    async fn fetch(&self, location: &DocumentLocation) -> Result<RawDocument, FetchError>;
}

/// Build the HTTP client used for document downloads.
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| FetchError::Transport {
            location: String::new(),
            reason: format!("failed to create HTTP client: {e}"),
        })
}

/// Fetches documents with a plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
    max_document_bytes: usize,
}

impl HttpDocumentFetcher {
    /// Create a fetcher from the scanning configuration.
    pub fn new(config: &ScanningConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config.request_timeout_secs, &config.user_agent)?,
            max_document_bytes: config.max_document_bytes,
        })
    }

    /// Use an existing client.
    #[must_use]
    pub fn with_client(client: Client, max_document_bytes: usize) -> Self {
        Self {
            client,
            max_document_bytes,
        }
    }

    async fn download(&self, location: &DocumentLocation) -> Result<(Vec<u8>, Option<String>), FetchError> {
        let url = location.as_str();
        let transport = |reason: String| FetchError::Transport {
            location: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Document request to {} returned HTTP {}", url, status.as_u16());
            return Err(FetchError::NotFound {
                location: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if let Some(len) = response.content_length() {
            if len > self.max_document_bytes as u64 {
                return Err(transport(format!(
                    "document is {len} bytes, limit is {}",
                    self.max_document_bytes
                )));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| transport(e.to_string()))? {
            if bytes.len() + chunk.len() > self.max_document_bytes {
                return Err(transport(format!(
                    "document exceeds the {} byte limit",
                    self.max_document_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok((bytes, content_type))
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, location: &DocumentLocation) -> Result<RawDocument, FetchError> {
        let scheme = location.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(FetchError::MalformedLocation(location.to_string()));
        }

        let (bytes, content_type) = self.download(location).await?;
        tracing::debug!(
            "Downloaded {} bytes from {} ({})",
            bytes.len(),
            location,
            content_type.as_deref().unwrap_or("no content type")
        );

        let size = bytes.len();
        let text = decode_text(location, bytes).await?;

        Ok(RawDocument {
            location: location.clone(),
            size,
            text,
            content_type,
        })
    }
}

/// Decode a document body into plain text.
///
/// PDF bodies are parsed on a blocking thread. Other bodies must be UTF-8.
pub async fn decode_text(location: &DocumentLocation, bytes: Vec<u8>) -> Result<String, FetchError> {
    let processing = |reason: String| FetchError::Processing {
        location: location.to_string(),
        reason,
    };

    if bytes.starts_with(PDF_MAGIC) {
        return tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| processing(format!("PDF parser aborted: {e}")))?
            .map_err(processing);
    }

    String::from_utf8(bytes).map_err(|_| processing("document is neither PDF nor UTF-8 text".to_string()))
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, String> {
    let document =
        lopdf::Document::load_mem(bytes).map_err(|e| format!("Error while reading PDF file: {e}"))?;

    if document.is_encrypted() {
        return Err("PDF is encrypted and cannot be processed.".to_string());
    }

    pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("Error while reading PDF file: {e}"))
}
