use std::io;

use filedrop_transfer::{CandidateFile, FileSource, ProgressReporter, STREAM_CHUNK_SIZE};
use filedrop_uploader::{TransferSender, TransferSubscription, UploadTransport};
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Url};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::error::HttpTransportError;

/// Multipart form field carrying the file.
pub const FORM_FIELD: &str = "file";

/// Highest percentage reported before the endpoint has answered.
///
/// 100 % is only reached through the success event, so a server-side
/// rejection never follows a completed progress bar.
const MAX_STREAMING_PERCENT: u8 = 99;

/// Uploads files with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    pub fn new() -> Result<Self, HttpTransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("filedrop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Creates a transport that shares an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Uploads `file` and waits for the endpoint's answer.
    ///
    /// Progress goes to `progress` as the body streams; the caller reports
    /// the outcome.
    async fn upload(
        &self,
        file: CandidateFile,
        url: Url,
        progress: TransferSender,
    ) -> Result<(), HttpTransportError> {
        let size = file.size_bytes;
        let mut reporter = ProgressReporter::new(size);
        let chunks = body_chunks(&file.source)
            .await?
            .inspect_ok(move |chunk| {
                let percent = reporter.advance(chunk.len() as u64);
                if let Some(percent) = percent.filter(|p| *p <= MAX_STREAMING_PERCENT) {
                    progress.progress(percent);
                }
            });

        let part = Part::stream_with_length(Body::wrap_stream(chunks), size)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part(FORM_FIELD, part);

        let resp = self.client.post(url).multipart(form).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HttpTransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(file = %file.name, status = status.as_u16(), "endpoint accepted upload");
        Ok(())
    }
}

impl UploadTransport for HttpTransport {
    fn send(&self, file: CandidateFile, endpoint: &str) -> TransferSubscription {
        let url = match parse_endpoint(endpoint) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "upload not started");
                return TransferSubscription::failed(e.to_string());
            }
        };

        let (tx, subscription) = TransferSubscription::channel();
        let transport = self.clone();
        tokio::spawn(async move {
            let name = file.name.clone();
            match transport.upload(file, url, tx.clone()).await {
                Ok(()) => tx.succeed().await,
                Err(e) => {
                    warn!(file = %name, error = %e, "HTTP upload failed");
                    tx.fail(e.to_string()).await;
                }
            }
        });
        subscription
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, HttpTransportError> {
    let invalid = |reason: String| HttpTransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };
    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

/// Splits a file source into body chunks of [`STREAM_CHUNK_SIZE`].
async fn body_chunks(
    source: &FileSource,
) -> Result<BoxStream<'static, io::Result<Vec<u8>>>, HttpTransportError> {
    match source {
        FileSource::Memory(data) => {
            let chunks: Vec<io::Result<Vec<u8>>> = data
                .chunks(STREAM_CHUNK_SIZE)
                .map(|chunk| Ok(chunk.to_vec()))
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
        FileSource::Disk(path) => {
            let file = tokio::fs::File::open(path).await?;
            Ok(ReaderStream::with_capacity(file, STREAM_CHUNK_SIZE)
                .map_ok(|chunk| chunk.to_vec())
                .boxed())
        }
    }
}
