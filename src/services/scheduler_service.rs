use crate::error::Result;
use crate::models::pipeline_run::RunStatus;
use crate::services::pipeline_service::Pipeline;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Cron-driven trigger for the pipeline. Only future ticks fire, so missed
/// periods are never backfilled.
pub struct SchedulerService {
    scheduler: JobScheduler,
}

impl SchedulerService {
    pub async fn new(pipeline: Pipeline, schedule: &str) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let pipeline = pipeline.clone();
            Box::pin(async move {
                trigger(&pipeline).await;
            })
        })?;
        scheduler.add(job).await?;

        tracing::info!(schedule, "Pipeline scheduled");
        Ok(Self { scheduler })
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// Run once unless a run is already in flight. Failures are logged; they
/// never stop the schedule.
pub async fn trigger(pipeline: &Pipeline) -> Option<RunStatus> {
    match pipeline.try_run().await {
        Some(report) => {
            if report.status == RunStatus::Failed {
                tracing::error!(
                    run_id = %report.run_id,
                    error = report.error.as_deref().unwrap_or_default(),
                    "Scheduled run failed"
                );
            }
            Some(report.status)
        }
        None => {
            tracing::warn!("Previous run still in progress; skipping this tick");
            None
        }
    }
}
