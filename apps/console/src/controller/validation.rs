//! User input for each workflow and the checks run before any request.

use client_core::UploadFile;
use shared::protocol::{
    CaptureRequest, GenerationRequest, DEFAULT_BPF_FILTER, DEFAULT_CAPTURE_DURATION_SECS,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("Please select a start date")]
    MissingStartDate,
    #[error("Please select a file")]
    MissingFile,
    #[error("Could not read file: {0}")]
    UnreadableFile(String),
    #[error("Please input interface name")]
    MissingInterface,
    #[error("live capture is not available in this console")]
    CaptureNotWired,
}

impl TriggerError {
    /// Validation failures are announced; an unwired control stays silent.
    pub fn is_blocking_notice(&self) -> bool {
        !matches!(self, TriggerError::CaptureNotWired)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateInput {
    pub start_date: Option<String>,
    pub duration: Option<u32>,
}

impl GenerateInput {
    pub fn into_request(self) -> Result<GenerationRequest, TriggerError> {
        let start_date = self
            .start_date
            .filter(|date| !date.trim().is_empty())
            .ok_or(TriggerError::MissingStartDate)?;
        Ok(GenerationRequest {
            start_date,
            duration: self.duration,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadInput {
    pub file: Option<UploadFile>,
}

impl UploadInput {
    pub fn into_upload(self) -> Result<UploadFile, TriggerError> {
        self.file.ok_or(TriggerError::MissingFile)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureInput {
    pub interface: String,
    pub duration: Option<u64>,
    pub filter: String,
    pub max_packets: Option<u64>,
    pub tshark_path: Option<String>,
}

impl CaptureInput {
    pub fn into_request(self) -> Result<CaptureRequest, TriggerError> {
        let interface = self.interface.trim();
        if interface.is_empty() {
            return Err(TriggerError::MissingInterface);
        }
        let filter = self.filter.trim();
        let bpf = if filter.is_empty() {
            DEFAULT_BPF_FILTER
        } else {
            filter
        };
        Ok(CaptureRequest {
            interface: interface.to_string(),
            duration: self.duration.unwrap_or(DEFAULT_CAPTURE_DURATION_SECS),
            bpf: bpf.to_string(),
            max_packets: self.max_packets.filter(|n| *n > 0),
            tshark_path: self.tshark_path.filter(|p| !p.trim().is_empty()),
        })
    }
}
