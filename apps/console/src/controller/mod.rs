//! Workflow controllers: validate input, start backend calls, settle state.
//!
//! Triggers run synchronously on the event loop and spawn the network call;
//! completions come back as [`UiEvent`]s and are applied one at a time by
//! [`Controller::apply`], the only place workflow state changes after a
//! trigger. Every state change is published as a [`Transition`] to the view.

pub mod events;
pub mod state;
pub mod validation;

use std::sync::Arc;

use client_core::AnalysisBackend;
use shared::protocol::{AnalysisResult, GenerationResult};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::view::{render, Interface};
use events::{Transition, UiEvent, WorkflowKind};
use state::{StaleResponsePolicy, WorkflowSlot, WorkflowState};
use validation::{CaptureInput, GenerateInput, TriggerError, UploadInput};

pub struct Controller {
    backend: Arc<dyn AnalysisBackend>,
    policy: StaleResponsePolicy,
    interface: Interface,
    generate: WorkflowSlot<GenerationResult>,
    upload: WorkflowSlot<AnalysisResult>,
    capture: Option<WorkflowSlot<AnalysisResult>>,
    events_tx: UnboundedSender<UiEvent>,
    events_rx: UnboundedReceiver<UiEvent>,
}

impl Controller {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        policy: StaleResponsePolicy,
        capture_enabled: bool,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            backend,
            policy,
            interface: Interface::default(),
            generate: WorkflowSlot::default(),
            upload: WorkflowSlot::default(),
            capture: capture_enabled.then(WorkflowSlot::default),
            events_tx,
            events_rx,
        }
    }

    pub fn backend(&self) -> Arc<dyn AnalysisBackend> {
        Arc::clone(&self.backend)
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut Interface {
        &mut self.interface
    }

    pub fn generation_state(&self) -> &WorkflowState<GenerationResult> {
        self.generate.state()
    }

    /// `None` when live capture is not wired.
    pub fn capture_state(&self) -> Option<&WorkflowState<AnalysisResult>> {
        self.capture.as_ref().map(WorkflowSlot::state)
    }

    pub fn is_pending(&self, workflow: WorkflowKind) -> bool {
        match workflow {
            WorkflowKind::Generate => self.generate.is_pending(),
            WorkflowKind::Upload => self.upload.is_pending(),
            WorkflowKind::Capture => self.capture.as_ref().is_some_and(WorkflowSlot::is_pending),
        }
    }

    /// Backend calls that have not reported back yet, across all workflows.
    pub fn in_flight(&self) -> usize {
        self.generate.in_flight()
            + self.upload.in_flight()
            + self.capture.as_ref().map_or(0, WorkflowSlot::in_flight)
    }

    pub fn trigger_generate(&mut self, input: GenerateInput) -> Result<u64, TriggerError> {
        let request = self.checked(WorkflowKind::Generate, input.into_request())?;
        let generation = self.generate.begin();
        info!(workflow = %WorkflowKind::Generate, generation, start_date = %request.start_date, "workflow triggered");
        self.publish(Transition::GenerationPending);

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend
                .generate_data(request)
                .await
                .map_err(|err| err.message());
            let _ = tx.send(UiEvent::GenerationFinished { generation, outcome });
        });
        Ok(generation)
    }

    pub fn trigger_upload(&mut self, input: UploadInput) -> Result<u64, TriggerError> {
        let upload = self.checked(WorkflowKind::Upload, input.into_upload())?;
        let generation = self.upload.begin();
        info!(workflow = %WorkflowKind::Upload, generation, file = %upload.file_name, "workflow triggered");
        self.publish(Transition::UploadPending);

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend
                .analyze_file(upload)
                .await
                .map_err(|err| err.message());
            let _ = tx.send(UiEvent::UploadFinished { generation, outcome });
        });
        Ok(generation)
    }

    pub fn trigger_capture(&mut self, input: CaptureInput) -> Result<u64, TriggerError> {
        if self.capture.is_none() {
            debug!("capture trigger ignored; control not wired");
            return Err(TriggerError::CaptureNotWired);
        }
        let request = self.checked(WorkflowKind::Capture, input.into_request())?;
        let Some(slot) = self.capture.as_mut() else {
            return Err(TriggerError::CaptureNotWired);
        };
        let generation = slot.begin();
        info!(
            workflow = %WorkflowKind::Capture,
            generation,
            interface = %request.interface,
            bpf = %request.bpf,
            "workflow triggered"
        );
        self.publish(Transition::CapturePending);

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend
                .capture_and_analyze(request)
                .await
                .map_err(|err| err.message());
            let _ = tx.send(UiEvent::CaptureFinished { generation, outcome });
        });
        Ok(generation)
    }

    /// Settles the workflow a completion belongs to and publishes the result.
    ///
    /// Returns `None` when the completion was dropped as stale.
    pub fn apply(&mut self, event: UiEvent) -> Option<Transition> {
        let workflow = event.workflow();
        let policy = self.policy;
        let transition = match event {
            UiEvent::GenerationFinished {
                generation,
                outcome,
            } => match settle(&mut self.generate, workflow, generation, outcome, policy)? {
                Ok(result) => Transition::GenerationSucceeded(result),
                Err(message) => Transition::GenerationFailed(message),
            },
            UiEvent::UploadFinished {
                generation,
                outcome,
            } => match settle(&mut self.upload, workflow, generation, outcome, policy)? {
                Ok(result) => Transition::UploadSucceeded(result),
                Err(message) => Transition::UploadFailed(message),
            },
            UiEvent::CaptureFinished {
                generation,
                outcome,
            } => {
                let slot = self.capture.as_mut()?;
                match settle(slot, workflow, generation, outcome, policy)? {
                    Ok(result) => Transition::CaptureSucceeded(result),
                    Err(message) => Transition::CaptureFailed(message),
                }
            }
        };
        Some(self.publish(transition))
    }

    /// Waits for the next completion. Never resolves while nothing is in flight.
    pub async fn recv_event(&mut self) -> Option<UiEvent> {
        self.events_rx.recv().await
    }

    /// Drives completions until `workflow` leaves `Pending`.
    pub async fn settle(&mut self, workflow: WorkflowKind) -> Vec<Transition> {
        let mut transitions = Vec::new();
        while self.is_pending(workflow) {
            let Some(event) = self.recv_event().await else {
                break;
            };
            if let Some(transition) = self.apply(event) {
                transitions.push(transition);
            }
        }
        transitions
    }

    /// Reports a trigger that never reached the backend.
    pub fn reject(&mut self, workflow: WorkflowKind, err: TriggerError) -> TriggerError {
        warn!(workflow = %workflow, "trigger rejected: {err}");
        if err.is_blocking_notice() {
            self.interface.alert(err.to_string());
        }
        err
    }

    fn checked<T>(
        &mut self,
        workflow: WorkflowKind,
        checked: Result<T, TriggerError>,
    ) -> Result<T, TriggerError> {
        checked.map_err(|err| self.reject(workflow, err))
    }

    fn publish(&mut self, transition: Transition) -> Transition {
        render::apply_transition(&mut self.interface, &transition);
        transition
    }
}

fn settle<T: Clone>(
    slot: &mut WorkflowSlot<T>,
    workflow: WorkflowKind,
    generation: u64,
    outcome: Result<T, String>,
    policy: StaleResponsePolicy,
) -> Option<Result<T, String>> {
    let latest = slot.generation();
    if !slot.complete(generation, outcome.clone(), policy) {
        debug!(workflow = %workflow, generation, latest, "discarded stale completion");
        return None;
    }
    match &outcome {
        Ok(_) => info!(workflow = %workflow, generation, "workflow succeeded"),
        Err(message) => warn!(workflow = %workflow, generation, "workflow failed: {message}"),
    }
    Some(outcome)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
