use crate::error::{Error, Result};
use crate::models::pipeline_run::{RunReport, RunStatus, StepName};
use crate::services::{
    load_service::LoadService, run_log_service::RunLogService, schema_service::SchemaService,
    transform_service::TransformService, user_api_service::UserApiService,
};
use chrono::Utc;
use reqwest::Client;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::Instrument;

/// What to do when the fetched payload carries no user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPayloadPolicy {
    /// Fail the run.
    Fail,
    /// Log a warning, skip the import and finish the run as `skipped`.
    Skip,
}

impl FromStr for MissingPayloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected `fail` or `skip`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProbePolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_base_url: String,
    pub api_endpoint: String,
    pub users_csv_path: PathBuf,
    pub probe: ProbePolicy,
    pub missing_payload_policy: MissingPayloadPolicy,
}

/// create_table -> sense_api_presence -> fetch_user -> filter_user -> persist_user
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    schema: SchemaService,
    api: UserApiService,
    loader: LoadService,
    run_log: RunLogService,
    run_lock: Arc<Mutex<()>>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, pool: SqlitePool, client: Client) -> Self {
        let api = UserApiService::new(client, &config.api_base_url, &config.api_endpoint);
        Self {
            schema: SchemaService::new(pool.clone()),
            loader: LoadService::new(pool.clone()),
            run_log: RunLogService::new(pool),
            api,
            config,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run now, waiting for any in-flight run to finish first.
    pub async fn run(&self) -> RunReport {
        let _guard = self.run_lock.lock().await;
        self.run_exclusive().await
    }

    /// Run now unless another run is in flight, in which case `None`.
    pub async fn try_run(&self) -> Option<RunReport> {
        let _guard = self.run_lock.try_lock().ok()?;
        Some(self.run_exclusive().await)
    }

    async fn run_exclusive(&self) -> RunReport {
        let mut report = RunReport::start();
        let span = tracing::info_span!("pipeline_run", run_id = %report.run_id);

        async {
            tracing::info!("Pipeline run started");
            let outcome = self.execute(&mut report).await;
            report.finished_at = Some(Utc::now());
            match outcome {
                Ok(status) => report.status = status,
                Err(e) => {
                    report.status = RunStatus::Failed;
                    report.error = Some(e.to_string());
                }
            }
            tracing::info!(status = report.status.as_str(), "Pipeline run finished");

            if let Err(e) = self.run_log.record(&report).await {
                tracing::warn!(error = %e, "Failed to record pipeline run");
            }
        }
        .instrument(span)
        .await;

        report
    }

    async fn execute(&self, report: &mut RunReport) -> Result<RunStatus> {
        report.begin(StepName::CreateTable);
        report.track(StepName::CreateTable, self.schema.ensure_tables().await)?;
        // `pipeline_runs` exists from here on; make the in-flight run visible.
        if let Err(e) = self.run_log.record(report).await {
            tracing::warn!(error = %e, "Failed to record running pipeline run");
        }

        report.begin(StepName::SenseApiPresence);
        let probe = self.config.probe;
        let attempts = report.track(
            StepName::SenseApiPresence,
            self.api
                .wait_until_available(probe.interval, probe.max_attempts)
                .await,
        )?;
        report.annotate(
            StepName::SenseApiPresence,
            format!("available after {} attempt(s)", attempts),
        );

        report.begin(StepName::FetchUser);
        let payload = report.track(StepName::FetchUser, self.api.fetch_user().await)?;

        report.begin(StepName::FilterUser);
        let path = &self.config.users_csv_path;
        let user = match TransformService::process_user(Some(&payload), path).await {
            Ok(user) => user,
            Err(e) => return Err(report.failed(StepName::FilterUser, e)),
        };
        let Some(user) = user else {
            return self.on_missing_payload(report);
        };
        report.succeeded(StepName::FilterUser, Some(user.email));

        report.begin(StepName::PersistUser);
        let rows = report.track(StepName::PersistUser, self.loader.import_csv(path).await)?;
        report.annotate(StepName::PersistUser, format!("{} row(s) imported", rows));

        Ok(RunStatus::Succeeded)
    }

    fn on_missing_payload(&self, report: &mut RunReport) -> Result<RunStatus> {
        match self.config.missing_payload_policy {
            MissingPayloadPolicy::Fail => {
                let err = Error::MissingPayload(format!(
                    "response from {} has no `results`",
                    self.api.url()
                ));
                Err(report.failed(StepName::FilterUser, err))
            }
            MissingPayloadPolicy::Skip => {
                report.skipped(StepName::FilterUser, "response has no `results`");
                report.skipped(StepName::PersistUser, "nothing to import");
                Ok(RunStatus::Skipped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_payload_policy_from_str() {
        assert_eq!("FAIL".parse::<MissingPayloadPolicy>(), Ok(MissingPayloadPolicy::Fail));
        assert_eq!("skip".parse::<MissingPayloadPolicy>(), Ok(MissingPayloadPolicy::Skip));
        assert!("drop".parse::<MissingPayloadPolicy>().is_err());
    }
}
