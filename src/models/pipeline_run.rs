use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    CreateTable,
    SenseApiPresence,
    FetchUser,
    FilterUser,
    PersistUser,
}

impl StepName {
    pub const ALL: [StepName; 5] = [
        StepName::CreateTable,
        StepName::SenseApiPresence,
        StepName::FetchUser,
        StepName::FilterUser,
        StepName::PersistUser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::CreateTable => "create_table",
            StepName::SenseApiPresence => "sense_api_presence",
            StepName::FetchUser => "fetch_user",
            StepName::FilterUser => "filter_user",
            StepName::PersistUser => "persist_user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: StepName,
    pub state: StepState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub detail: Option<String>,
}

impl StepReport {
    pub fn pending(name: StepName) -> Self {
        Self {
            name,
            state: StepState::Pending,
            started_at: None,
            finished_at: None,
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Skipped => "skipped",
        }
    }

    /// Process exit code for a one-shot run; only a failed run is non-zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Failed => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub steps: Vec<StepReport>,
    pub error: Option<String>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Running,
            steps: StepName::ALL.iter().copied().map(StepReport::pending).collect(),
            error: None,
        }
    }

    // `steps` is laid out in `StepName::ALL` order, which is declaration order.
    pub fn step(&self, name: StepName) -> &StepReport {
        &self.steps[name as usize]
    }

    fn step_mut(&mut self, name: StepName) -> &mut StepReport {
        &mut self.steps[name as usize]
    }

    pub(crate) fn begin(&mut self, name: StepName) {
        tracing::info!(step = name.as_str(), "Step started");
        let step = self.step_mut(name);
        step.state = StepState::Running;
        step.started_at = Some(Utc::now());
    }

    pub(crate) fn succeeded(&mut self, name: StepName, detail: Option<String>) {
        tracing::info!(step = name.as_str(), detail = ?detail, "Step succeeded");
        self.finish(name, StepState::Succeeded, detail);
    }

    pub(crate) fn skipped(&mut self, name: StepName, detail: &str) {
        tracing::warn!(step = name.as_str(), detail, "Step skipped");
        self.finish(name, StepState::Skipped, Some(detail.to_string()));
    }

    /// Marks the step failed and hands the error back for propagation.
    pub(crate) fn failed(&mut self, name: StepName, err: Error) -> Error {
        tracing::error!(step = name.as_str(), error = %err, "Step failed");
        self.finish(name, StepState::Failed, Some(err.to_string()));
        err
    }

    pub(crate) fn track<T>(&mut self, name: StepName, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.succeeded(name, None);
                Ok(value)
            }
            Err(e) => Err(self.failed(name, e)),
        }
    }

    pub(crate) fn annotate(&mut self, name: StepName, detail: String) {
        self.step_mut(name).detail = Some(detail);
    }

    fn finish(&mut self, name: StepName, state: StepState, detail: Option<String>) {
        let step = self.step_mut(name);
        step.state = state;
        step.finished_at = Some(Utc::now());
        step.detail = detail;
    }
}
