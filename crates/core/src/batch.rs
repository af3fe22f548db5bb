//! Run the same sequence of actions over many uploads.
//!
//! Each file is processed on its own: a failure is recorded in that file's
//! report and the next file is still processed.

use crate::error::SweepResult;
use crate::export::ExportArtifact;
use crate::session::{Action, Outcome, Session};
use crate::upload::UploadedFile;
use sweeper_viz::ChartSpec;

/// Ordered actions applied to every file.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action.
    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Everything one file produced.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub session: Session,
    pub messages: Vec<String>,
    pub charts: Vec<ChartSpec>,
    pub artifacts: Vec<ExportArtifact>,
}

/// Result of processing one upload.
#[derive(Debug)]
pub struct FileReport {
    pub file_name: String,
    pub result: SweepResult<ProcessedFile>,
}

impl FileReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Open a session for `upload` and apply every action of `plan` in order.
///
/// # Errors
///
/// Stops at the first failing step.
pub fn process(upload: &UploadedFile, plan: &Plan) -> SweepResult<ProcessedFile> {
    let mut session = Session::open(upload)?;
    let mut messages = Vec::new();
    let mut charts = Vec::new();
    let mut artifacts = Vec::new();

    for action in &plan.actions {
        let outcome = session.apply(action.clone())?;
        messages.push(outcome.message());
        match outcome {
            Outcome::Message(_) => {}
            Outcome::Chart(chart) => charts.push(chart),
            Outcome::Artifact(artifact) => artifacts.push(artifact),
        }
    }

    Ok(ProcessedFile {
        session,
        messages,
        charts,
        artifacts,
    })
}

/// Process every upload independently.
pub fn run_batch<I>(uploads: I, plan: &Plan) -> Vec<FileReport>
where
    I: IntoIterator<Item = UploadedFile>,
{
    uploads
        .into_iter()
        .map(|upload| {
            let result = process(&upload, plan);
            if let Err(e) = &result {
                tracing::warn!("Skipping {}: {}", upload.name(), e);
            }
            FileReport {
                file_name: upload.name().to_string(),
                result,
            }
        })
        .collect()
}
