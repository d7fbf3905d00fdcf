use shared::{
    protocol::{AnalysisResult, GenerationResult, Recommendation},
    routes::{self, SessionResources},
};

use super::{Emphasis, Interface, RecommendationBlock, StatusNotice, Tone};
use crate::controller::events::Transition;

const CAPTURE_IN_PROGRESS: &str = "Capturing real network traffic and analyzing, please wait...";
const CAPTURE_FINISHED: &str = "Capture & analysis finished. You can view results below.";

/// Reflects one workflow transition into the interface.
pub fn apply_transition(interface: &mut Interface, transition: &Transition) {
    match transition {
        Transition::GenerationPending => {
            interface.generation_status.visible = true;
        }
        Transition::GenerationSucceeded(result) => render_generated_sample(interface, result),
        Transition::GenerationFailed(message) => {
            interface.generation_status.replace(
                StatusNotice::new(
                    Tone::Danger,
                    format!("Error generating sample data: {message}"),
                )
                .dismissable(),
            );
        }
        Transition::UploadPending => {
            interface.loading = true;
            interface.results_visible = false;
        }
        Transition::UploadSucceeded(result) => {
            interface.loading = false;
            interface.results_visible = true;
            render_analysis(interface, result);
        }
        Transition::UploadFailed(message) => {
            interface.alert(format!("Error: {message}"));
            interface.loading = false;
        }
        Transition::CapturePending => {
            interface
                .capture_status
                .replace(StatusNotice::new(Tone::Info, CAPTURE_IN_PROGRESS));
            interface.loading = true;
            interface.results_visible = false;
        }
        Transition::CaptureSucceeded(result) => {
            render_analysis(interface, result);
            interface.loading = false;
            interface.results_visible = true;
            interface
                .capture_status
                .replace(StatusNotice::new(Tone::Success, CAPTURE_FINISHED));
        }
        Transition::CaptureFailed(message) => {
            interface.capture_status.replace(StatusNotice::new(
                Tone::Danger,
                format!("Error during capture/analyze: {message}"),
            ));
            interface.loading = false;
        }
    }
}

fn render_generated_sample(interface: &mut Interface, result: &GenerationResult) {
    let text = match result.records {
        Some(records) => format!("Sample data generated successfully! ({records} records)"),
        None => "Sample data generated successfully!".to_string(),
    };
    interface.generation_status.replace(
        StatusNotice::new(Tone::Success, text)
            .with_link("Download", routes::sample_download(&result.filename)),
    );
}

/// Result renderer shared by the upload and capture analyses.
pub fn render_analysis(interface: &mut Interface, result: &AnalysisResult) {
    let stats = &result.statistics;
    interface.statistics.total_records = stats.total_records.to_string();
    interface.statistics.anomaly_count = stats.anomaly_count.to_string();
    interface.statistics.anomaly_percentage = format!("{}%", stats.anomaly_percentage);

    let resources = SessionResources::for_session(&result.timestamp);
    interface.scatter_src = Some(resources.scatter);
    interface.distribution_src = Some(resources.distribution);
    interface.download_target = Some(resources.download);
    interface.session = Some(resources.timestamp);

    if result.recommendations.is_empty() {
        interface.recommendations_visible = false;
    } else {
        interface.recommendations = result
            .recommendations
            .iter()
            .map(recommendation_block)
            .collect();
        interface.recommendations_visible = true;
    }
}

fn recommendation_block(rec: &Recommendation) -> RecommendationBlock {
    RecommendationBlock {
        heading: format!("{} ({} Severity)", rec.kind, rec.severity),
        emphasis: if rec.severity.is_high() {
            Emphasis::High
        } else {
            Emphasis::Elevated
        },
        description: rec.description.clone(),
        items: rec.recommendations.clone(),
    }
}
