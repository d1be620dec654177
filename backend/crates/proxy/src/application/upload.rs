//! Dataset Upload Use Case
//!
//! Enforces the upload ceiling twice: on the declared `Content-Length`
//! before anything reaches upstream, then on the bytes actually read while
//! the file streams through.

use http::Method;
use std::sync::Arc;

use crate::application::config::ProxyConfig;
use crate::application::forward::{ForwardOutput, ForwardUseCase};
use crate::domain::route::DATASET_UPLOAD;
use crate::domain::upstream::{DatasetUpload, UpstreamApi, UpstreamRequest};
use crate::error::{ProxyError, ProxyResult};

pub const UPLOAD_PATH: &str = "/datasets/upload";

/// Running byte count against the upload ceiling
#[derive(Debug, Clone, Copy)]
pub struct UploadBudget {
    limit: u64,
    used: u64,
}

impl UploadBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Reject a request whose declared length is already over the ceiling
    pub fn check_declared(&self, content_length: Option<u64>) -> ProxyResult<()> {
        match content_length {
            Some(len) if len > self.limit => Err(too_large(self.limit)),
            _ => Ok(()),
        }
    }

    /// Account for `n` more bytes
    pub fn consume(&mut self, n: usize) -> ProxyResult<()> {
        self.used = self.used.saturating_add(n as u64);
        if self.used > self.limit {
            return Err(too_large(self.limit));
        }
        Ok(())
    }

    pub fn used(&self) -> u64 {
        self.used
    }
}

fn too_large(limit: u64) -> ProxyError {
    ProxyError::PayloadTooLarge {
        message: DATASET_UPLOAD
            .too_large
            .unwrap_or(DATASET_UPLOAD.fallback)
            .to_string(),
        limit,
    }
}

/// Upload Dataset Use Case
pub struct UploadDatasetUseCase<U>
where
    U: UpstreamApi,
{
    forward: ForwardUseCase<U>,
    config: Arc<ProxyConfig>,
}

impl<U> UploadDatasetUseCase<U>
where
    U: UpstreamApi,
{
    pub fn new(upstream: Arc<U>, config: Arc<ProxyConfig>) -> Self {
        Self {
            forward: ForwardUseCase::new(upstream),
            config,
        }
    }

    /// Fresh budget sized to the configured ceiling
    pub fn budget(&self) -> UploadBudget {
        UploadBudget::new(self.config.max_upload_bytes)
    }

    /// Forward the upload as multipart while the file is still being read
    pub async fn execute(
        &self,
        authorization: Option<http::HeaderValue>,
        upload: DatasetUpload,
    ) -> ProxyResult<ForwardOutput> {
        tracing::info!(
            fields = upload.fields.len(),
            file_name = %upload.file.file_name,
            "Forwarding dataset upload"
        );

        let request = UpstreamRequest::new(Method::POST, UPLOAD_PATH)
            .with_authorization(authorization)
            .with_upload(upload);

        self.forward.execute(&DATASET_UPLOAD, request).await
    }
}
