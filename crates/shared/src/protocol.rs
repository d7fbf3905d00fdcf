use serde::{Deserialize, Serialize};

use crate::domain::{SampleFilename, SessionTimestamp, Severity};

pub const DEFAULT_BPF_FILTER: &str = "tcp or udp";
pub const DEFAULT_CAPTURE_DURATION_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub start_date: String,
    /// Hours of traffic to synthesize; the backend picks a default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub filename: SampleFilename,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub interface: String,
    pub duration: u64,
    pub bpf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_packets: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tshark_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total_records: u64,
    pub anomaly_count: u64,
    pub anomaly_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Shared result of the upload and capture analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub statistics: AnalysisStatistics,
    pub timestamp: SessionTimestamp,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_filename: Option<String>,
}
