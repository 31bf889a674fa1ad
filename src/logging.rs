use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// timestamp LEVEL target - message
    Compact,
    /// JSON lines
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// An explicit `RUST_LOG` is used as given. Otherwise `info`, with noisy
/// dependency crates lowered to `warn`.
fn filter_directives(rust_log: Option<&str>) -> String {
    if let Some(directives) = rust_log.filter(|s| !s.trim().is_empty()) {
        return directives.to_string();
    }
    let mut directives = vec!["info".to_string()];
    for target in ["sqlx", "hyper", "reqwest", "tokio_cron_scheduler"] {
        directives.push(format!("{}=warn", target));
    }
    directives.join(",")
}

fn build_env_filter() -> EnvFilter {
    let rust_log = std::env::var("RUST_LOG").ok();
    EnvFilter::try_new(filter_directives(rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_logging(format: LogFormat) {
    let builder = tracing_subscriber::fmt().with_env_filter(build_env_filter());
    let result = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Compact => builder.compact().with_target(true).try_init(),
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
