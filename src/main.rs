use clap::{Parser, Subcommand};
use tracing::info;
use user_processing::{
    build_pipeline,
    config::{get_config, init_config},
    database::pool::create_pool,
    logging::{init_logging, LogFormat},
    services::scheduler_service::{trigger, SchedulerService},
};

/// Fetch a random user from the user API and persist it to the users table
#[derive(Parser, Debug)]
#[command(name = "user-processing", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one pipeline run now and print its report as JSON
    Run,
    /// Run the pipeline on its cron schedule until interrupted
    Schedule {
        /// Trigger one run immediately, before the first tick
        #[arg(long)]
        run_on_start: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_config()?;
    let config = get_config();
    init_logging(LogFormat::parse(&config.log_format));

    let pool = create_pool(&config.database_url).await?;
    let pipeline = build_pipeline(config, pool)?;

    match cli.command.unwrap_or(Command::Schedule { run_on_start: false }) {
        Command::Run => {
            let report = pipeline.run().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            let code = report.status.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }
        Command::Schedule { run_on_start } => {
            let mut scheduler = SchedulerService::new(pipeline.clone(), &config.schedule).await?;
            scheduler.start().await?;

            if run_on_start {
                trigger(&pipeline).await;
            }

            tokio::signal::ctrl_c().await?;
            info!("Shutting down scheduler");
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}
