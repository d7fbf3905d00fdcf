use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    error::failure_message,
    protocol::{AnalysisResult, CaptureRequest, GenerationRequest, GenerationResult},
    routes,
};
use tracing::{debug, warn};
use url::Url;

pub mod error;

pub use error::ClientError;

/// A file selected for upload analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadUpload {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self { file_name, bytes })
    }

    fn mime_type(&self) -> &'static str {
        if self.file_name.to_ascii_lowercase().ends_with(".csv") {
            "text/csv"
        } else {
            "application/octet-stream"
        }
    }
}

/// Backend operations the workflows depend on.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn generate_data(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, ClientError>;
    async fn analyze_file(&self, upload: UploadFile) -> Result<AnalysisResult, ClientError>;
    async fn capture_and_analyze(
        &self,
        request: CaptureRequest,
    ) -> Result<AnalysisResult, ClientError>;
    /// GET of a derived resource (sample file, chart, report) by path.
    async fn fetch_artifact(&self, path: &str) -> Result<Vec<u8>, ClientError>;
}

pub struct HttpAnalysisClient {
    http: Client,
    server_url: String,
}

impl HttpAnalysisClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        Url::parse(server_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: server_url.to_string(),
            source,
        })?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }
}

async fn read_envelope<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body: Value = serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })?;
    if let Some(message) = failure_message(&body) {
        warn!(endpoint, status = status.as_u16(), "backend reported failure: {message}");
        return Err(ClientError::Remote(message));
    }
    debug!(endpoint, status = status.as_u16(), "backend call succeeded");
    serde_json::from_value(body).map_err(|source| ClientError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    async fn generate_data(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, ClientError> {
        let response = self
            .http
            .post(self.endpoint(routes::GENERATE_DATA))
            .json(&request)
            .send()
            .await?;
        read_envelope(routes::GENERATE_DATA, response).await
    }

    async fn analyze_file(&self, upload: UploadFile) -> Result<AnalysisResult, ClientError> {
        let mime_type = upload.mime_type();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime_type)?;
        let response = self
            .http
            .post(self.endpoint(routes::ANALYZE))
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        read_envelope(routes::ANALYZE, response).await
    }

    async fn capture_and_analyze(
        &self,
        request: CaptureRequest,
    ) -> Result<AnalysisResult, ClientError> {
        let response = self
            .http
            .post(self.endpoint(routes::CAPTURE_AND_ANALYZE))
            .json(&request)
            .send()
            .await?;
        read_envelope(routes::CAPTURE_AND_ANALYZE, response).await
    }

    async fn fetch_artifact(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(self.endpoint(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        debug!(endpoint = path, size = bytes.len(), "fetched artifact");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
