//! Upstream port
//!
//! What a route forwards and the trait the HTTP implementation provides.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, header};
use platform::client::forwarded_authorization;
use platform::upstream::{UpstreamError, UpstreamResponse};
use thiserror::Error;
use tokio::sync::mpsc;

/// Buffered text field of a dataset upload
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// The upload was cut short while the file was streaming
#[derive(Debug, Clone, Error)]
#[error("upload aborted: {0}")]
pub struct UploadAborted(pub String);

/// File field, read from the browser while it is sent upstream
#[derive(Debug)]
pub struct UploadStream {
    pub name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    /// An `Err` item aborts the upstream request
    pub chunks: mpsc::Receiver<Result<Bytes, UploadAborted>>,
}

/// Dataset upload: text fields first, the file last
#[derive(Debug)]
pub struct DatasetUpload {
    pub fields: Vec<UploadPart>,
    pub file: UploadStream,
}

/// Body forwarded upstream
#[derive(Debug, Default)]
pub enum ForwardBody {
    #[default]
    Empty,
    /// Raw bytes with the caller's content type, forwarded unchanged
    Bytes {
        content_type: HeaderValue,
        bytes: Bytes,
    },
    Upload(DatasetUpload),
}

/// Request forwarded to the upstream API
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Upstream path, relative to the base URL
    pub path: String,
    /// Raw query string, without `?`
    pub query: Option<String>,
    /// Caller's `Authorization`, verbatim
    pub authorization: Option<HeaderValue>,
    pub body: ForwardBody,
}

impl UpstreamRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            authorization: None,
            body: ForwardBody::Empty,
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn with_authorization(mut self, authorization: Option<HeaderValue>) -> Self {
        self.authorization = authorization;
        self
    }

    /// Copy `Authorization` from inbound headers
    pub fn authorized_by(self, headers: &HeaderMap) -> Self {
        self.with_authorization(forwarded_authorization(headers))
    }

    /// JSON body; an empty payload forwards no body at all
    pub fn with_json(self, body: Bytes) -> Self {
        self.with_body(None, body)
    }

    /// Body with the caller's `Content-Type`, JSON when none was sent.
    /// A blank payload forwards no body at all.
    pub fn with_body(mut self, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        self.body = if body.iter().all(u8::is_ascii_whitespace) {
            ForwardBody::Empty
        } else {
            ForwardBody::Bytes {
                content_type: content_type
                    .unwrap_or_else(|| HeaderValue::from_static("application/json")),
                bytes: body,
            }
        };
        self
    }

    /// Copy body and `Content-Type` from an inbound request
    pub fn with_body_from(self, headers: &HeaderMap, body: Bytes) -> Self {
        self.with_body(headers.get(header::CONTENT_TYPE).cloned(), body)
    }

    pub fn with_upload(mut self, upload: DatasetUpload) -> Self {
        self.body = ForwardBody::Upload(upload);
        self
    }
}

/// Upstream API port
#[trait_variant::make(UpstreamApi: Send)]
pub trait LocalUpstreamApi {
    /// Send one request. `Err` only when no HTTP response was obtained.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}
