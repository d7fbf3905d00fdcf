//! Completions flowing back into the event loop and the transitions they cause.

use std::fmt;

use shared::protocol::{AnalysisResult, GenerationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    Generate,
    Upload,
    Capture,
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowKind::Generate => "generate",
            WorkflowKind::Upload => "upload_analyze",
            WorkflowKind::Capture => "capture_analyze",
        })
    }
}

/// A finished backend call, tagged with the generation that started it.
#[derive(Debug)]
pub enum UiEvent {
    GenerationFinished {
        generation: u64,
        outcome: Result<GenerationResult, String>,
    },
    UploadFinished {
        generation: u64,
        outcome: Result<AnalysisResult, String>,
    },
    CaptureFinished {
        generation: u64,
        outcome: Result<AnalysisResult, String>,
    },
}

impl UiEvent {
    pub fn workflow(&self) -> WorkflowKind {
        match self {
            UiEvent::GenerationFinished { .. } => WorkflowKind::Generate,
            UiEvent::UploadFinished { .. } => WorkflowKind::Upload,
            UiEvent::CaptureFinished { .. } => WorkflowKind::Capture,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            UiEvent::GenerationFinished { generation, .. }
            | UiEvent::UploadFinished { generation, .. }
            | UiEvent::CaptureFinished { generation, .. } => *generation,
        }
    }
}

/// State changes the view subscribes to.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    GenerationPending,
    GenerationSucceeded(GenerationResult),
    GenerationFailed(String),
    UploadPending,
    UploadSucceeded(AnalysisResult),
    UploadFailed(String),
    CapturePending,
    CaptureSucceeded(AnalysisResult),
    CaptureFailed(String),
}

impl Transition {
    pub fn workflow(&self) -> WorkflowKind {
        match self {
            Transition::GenerationPending
            | Transition::GenerationSucceeded(_)
            | Transition::GenerationFailed(_) => WorkflowKind::Generate,
            Transition::UploadPending
            | Transition::UploadSucceeded(_)
            | Transition::UploadFailed(_) => WorkflowKind::Upload,
            Transition::CapturePending
            | Transition::CaptureSucceeded(_)
            | Transition::CaptureFailed(_) => WorkflowKind::Capture,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Transition::GenerationSucceeded(_)
                | Transition::UploadSucceeded(_)
                | Transition::CaptureSucceeded(_)
        )
    }
}
