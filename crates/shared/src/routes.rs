//! Endpoint paths, including the resources derived from a session timestamp.

use crate::domain::{SampleFilename, SessionTimestamp};

pub const GENERATE_DATA: &str = "/generate_data";
pub const ANALYZE: &str = "/analyze";
pub const CAPTURE_AND_ANALYZE: &str = "/capture_and_analyze";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationKind {
    Scatter,
    Distribution,
}

impl VisualizationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VisualizationKind::Scatter => "scatter",
            VisualizationKind::Distribution => "distribution",
        }
    }
}

pub fn sample_download(filename: &SampleFilename) -> String {
    format!("/download_sample/{filename}")
}

pub fn visualization(timestamp: &SessionTimestamp, kind: VisualizationKind) -> String {
    format!("/visualization/{timestamp}/{}", kind.as_str())
}

pub fn report_download(timestamp: &SessionTimestamp) -> String {
    format!("/download/{timestamp}")
}

/// Every address derived from one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResources {
    pub timestamp: SessionTimestamp,
    pub scatter: String,
    pub distribution: String,
    pub download: String,
}

impl SessionResources {
    pub fn for_session(timestamp: &SessionTimestamp) -> Self {
        Self {
            timestamp: timestamp.clone(),
            scatter: visualization(timestamp, VisualizationKind::Scatter),
            distribution: visualization(timestamp, VisualizationKind::Distribution),
            download: report_download(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_every_resource_from_the_same_timestamp() {
        let ts = SessionTimestamp::new("20240101-0102");
        let resources = SessionResources::for_session(&ts);
        assert_eq!(resources.scatter, "/visualization/20240101-0102/scatter");
        assert_eq!(resources.distribution, "/visualization/20240101-0102/distribution");
        assert_eq!(resources.download, "/download/20240101-0102");
    }

    #[test]
    fn sample_download_threads_filename_unchanged() {
        let filename = SampleFilename::new("sample_2024.csv");
        assert_eq!(sample_download(&filename), "/download_sample/sample_2024.csv");
    }
}
