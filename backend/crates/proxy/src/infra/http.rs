//! reqwest implementation of the upstream port

use http::{HeaderMap, HeaderValue, header};
use platform::upstream::{UpstreamClient, UpstreamError, UpstreamResponse};
use reqwest::multipart::{Form, Part};
use tokio_stream::wrappers::ReceiverStream;

use crate::domain::upstream::{DatasetUpload, ForwardBody, UpstreamApi, UpstreamRequest};

/// Upstream API over HTTP
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: UpstreamClient,
}

impl HttpUpstream {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &UpstreamClient {
        &self.client
    }
}

impl UpstreamApi for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut builder = self
            .client
            .request(request.method, &request.path, request.query.as_deref())
            .header(header::ACCEPT, "application/json");

        if let Some(authorization) = request.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        builder = match request.body {
            ForwardBody::Empty => builder,
            ForwardBody::Bytes {
                content_type,
                bytes,
            } => builder.header(header::CONTENT_TYPE, content_type).body(bytes),
            ForwardBody::Upload(upload) => builder.multipart(build_form(upload)),
        };

        self.client.execute(builder).await
    }
}

/// Re-encode the upload: buffered text fields, then the file as a stream
fn build_form(upload: DatasetUpload) -> Form {
    let DatasetUpload { fields, file } = upload;

    let form = fields.into_iter().fold(Form::new(), |form, field| {
        let part = Part::bytes(field.bytes.to_vec());
        form.part(field.name, with_content_type(part, field.content_type.as_deref()))
    });

    let body = reqwest::Body::wrap_stream(ReceiverStream::new(file.chunks));
    let part = Part::stream(body).file_name(file.file_name);
    form.part(file.name, with_content_type(part, file.content_type.as_deref()))
}

// An unparseable type is dropped; upstream sniffs the file.
fn with_content_type(part: Part, content_type: Option<&str>) -> Part {
    let Some(value) = content_type.and_then(|ct| HeaderValue::from_str(ct).ok()) else {
        return part;
    };
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, value);
    part.headers(headers)
}
