use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::{BackendClient, EvaluatorApi};
use crate::config::Config;
use crate::models::JobStatus;
use crate::polling::{ResultsPoller, ResultsView};
use crate::render::text::describe;
use crate::routes::build_router;
use crate::state::AppState;
use crate::submission::{Document, SubmissionFlow, SubmissionForm};

#[derive(Parser, Debug)]
#[command(about = "CV evaluation frontend: web views, proxy routes and a polling client")]
struct Cmd {
    /// Base URL of the evaluation backend
    #[arg(long, global = true, env = "EVALUATOR_API_URL")]
    api_url: Option<String>,

    /// Delay between status fetches
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum SubCommandType {
    /// Serve the web views and proxy routes (default)
    Serve,
    /// Submit a CV and project report, then follow the evaluation
    Evaluate {
        #[arg(long)]
        job_title: String,
        #[arg(long)]
        cv: PathBuf,
        #[arg(long)]
        project: PathBuf,
        /// Print the job id and exit without polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Follow an existing evaluation job until it finishes
    Status { job_id: String },
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cmd::parse();

    let mut config = Config::from_env(args.api_url.as_deref())?;
    if let Some(ms) = args.poll_interval_ms {
        config = config.with_poll_interval(Duration::from_millis(ms));
    }
    init_tracing(&config.rust_log);

    match args.command.unwrap_or(SubCommandType::Serve) {
        SubCommandType::Serve => serve(config).await,
        SubCommandType::Evaluate {
            job_title,
            cv,
            project,
            no_wait,
        } => evaluate(&config, job_title, &cv, &project, no_wait).await,
        SubCommandType::Status { job_id } => {
            let api = Arc::new(BackendClient::new(&config)?);
            follow(api, config.poll_interval, &job_id).await
        }
    }
}

fn init_tracing(rust_log: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn serve(config: Config) -> Result<()> {
    info!("Starting CV evaluator web v{}", env!("CARGO_PKG_VERSION"));
    info!("Evaluation backend: {}", config.api_base_url);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let state = AppState::new(config)?;
    let app = build_router(state).layer(TraceLayer::new_for_http());

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("received ctrl+c interrupt, closing server");
        })
        .await?;

    Ok(())
}

async fn evaluate(
    config: &Config,
    job_title: String,
    cv: &Path,
    project: &Path,
    no_wait: bool,
) -> Result<()> {
    let api = Arc::new(BackendClient::new(config)?);
    let form = SubmissionForm {
        job_title,
        cv: Some(Document::from_path(cv).await?),
        project: Some(Document::from_path(project).await?),
    };

    let job_id = SubmissionFlow::new(api.clone()).submit(form).await?;
    println!("Evaluation job: {job_id}");
    if no_wait {
        return Ok(());
    }

    follow(api, config.poll_interval, &job_id).await
}

/// Prints every distinct view until polling stops.
async fn follow(api: Arc<dyn EvaluatorApi>, interval: Duration, job_id: &str) -> Result<()> {
    let poller = ResultsPoller::new(api, interval);
    let mut handle = poller.watch(job_id);

    let mut last = handle.current();
    println!("{}", describe(&last));
    while let Some(view) = handle.changed().await {
        if view != last {
            println!("{}", describe(&view));
        }
        last = view;
    }

    outcome(&last)
}

fn outcome(view: &ResultsView) -> Result<()> {
    match view {
        ResultsView::Job { job, .. } if job.status == JobStatus::Completed => Ok(()),
        ResultsView::Job { job, .. } if job.status == JobStatus::Failed => {
            bail!("evaluation {} failed", job.id)
        }
        ResultsView::Error { message } => bail!("{message}"),
        _ => bail!("polling stopped before the evaluation finished"),
    }
}
