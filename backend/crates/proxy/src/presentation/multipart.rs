//! Dataset upload reader
//!
//! Runs on its own task so the file can be forwarded while it is read.
//! Text fields are buffered; the file field goes out chunk by chunk
//! through a bounded channel and must be the last field.

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use bytes::BytesMut;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::application::upload::UploadBudget;
use crate::domain::upstream::{DatasetUpload, UploadAborted, UploadPart, UploadStream};
use crate::error::{ProxyError, ProxyResult};

/// File chunks in flight between the browser and upstream
const CHUNKS_IN_FLIGHT: usize = 8;

/// Handle on a running reader
pub struct UploadReader {
    /// Resolves once the file field is reached
    pub upload: oneshot::Receiver<DatasetUpload>,
    /// Outcome of reading the whole body
    pub task: JoinHandle<ProxyResult<()>>,
}

impl UploadReader {
    pub fn spawn(multipart: Multipart, budget: UploadBudget) -> Self {
        let (upload_tx, upload) = oneshot::channel();
        let task = tokio::spawn(read_upload(multipart, budget, upload_tx));
        Self { upload, task }
    }
}

/// Wait for the reader and surface its error, if any
pub async fn finish(task: JoinHandle<ProxyResult<()>>) -> ProxyResult<()> {
    task.await
        .map_err(|e| ProxyError::Multipart(format!("upload reader stopped: {e}")))?
}

async fn read_upload(
    mut multipart: Multipart,
    mut budget: UploadBudget,
    upload_tx: oneshot::Sender<DatasetUpload>,
) -> ProxyResult<()> {
    let mut fields = Vec::new();

    let chunks_tx = loop {
        let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? else {
            return Err(ProxyError::InvalidRequest("No file provided".to_string()));
        };

        let name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let mut buf = BytesMut::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                budget.consume(chunk.len())?;
                buf.extend_from_slice(&chunk);
            }
            fields.push(UploadPart {
                name,
                content_type,
                bytes: buf.freeze(),
            });
            continue;
        };

        let (chunks_tx, chunks) = mpsc::channel(CHUNKS_IN_FLIGHT);
        let upload = DatasetUpload {
            fields: std::mem::take(&mut fields),
            file: UploadStream {
                name,
                file_name,
                content_type,
                chunks,
            },
        };
        if upload_tx.send(upload).is_err() {
            return Ok(());
        }

        match stream_file(&mut field, &mut budget, &chunks_tx).await {
            Ok(true) => break chunks_tx,
            // Upstream stopped reading; the forward result says why
            Ok(false) => return Ok(()),
            Err(e) => return abort(&chunks_tx, e).await,
        }
    };

    // The upstream body stays open until no trailing field is confirmed
    match multipart.next_field().await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => {
            let err = ProxyError::InvalidRequest("The file must be the last field".to_string());
            abort(&chunks_tx, err).await
        }
        Err(e) => abort(&chunks_tx, multipart_error(e)).await,
    }
}

/// Returns `false` when the upstream side hung up
async fn stream_file(
    field: &mut Field<'_>,
    budget: &mut UploadBudget,
    chunks_tx: &mpsc::Sender<Result<bytes::Bytes, UploadAborted>>,
) -> ProxyResult<bool> {
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        budget.consume(chunk.len())?;
        if chunks_tx.send(Ok(chunk)).await.is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Fail the upstream body so a partial file is never accepted
async fn abort(
    chunks_tx: &mpsc::Sender<Result<bytes::Bytes, UploadAborted>>,
    err: ProxyError,
) -> ProxyResult<()> {
    let _ = chunks_tx.send(Err(UploadAborted(err.to_string()))).await;
    Err(err)
}

fn multipart_error(err: MultipartError) -> ProxyError {
    ProxyError::Multipart(err.body_text())
}
