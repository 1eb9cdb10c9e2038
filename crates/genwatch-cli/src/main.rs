//! GenWatch CLI - create a generation task and watch it to completion.

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use genwatch_client::{start_polling, ApiClient, PollConfig, TaskObserver};
use genwatch_core::{TaskId, TaskStatus};

/// GenWatch CLI - task status watcher
#[derive(Parser)]
#[command(name = "genwatch")]
#[command(about = "Watch GenWatch generation tasks to completion", long_about = None)]
struct Cli {
    /// Service base URL
    #[arg(short, long, default_value = "http://127.0.0.1:4200/research_chat")]
    endpoint: String,

    /// Authentication token
    #[arg(short, long)]
    token: String,

    /// Locale for server-side log messages
    #[arg(short, long, default_value = "cn")]
    locale: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch an existing task until it finishes
    Watch {
        /// Task ID
        id: i64,
    },

    /// Create a task and watch it
    Create {
        /// Generation prompt
        #[arg(short, long)]
        content: String,

        /// Session to append to (a new one is created when omitted)
        #[arg(short, long)]
        session: Option<String>,
    },
}

/// How a watched session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchOutcome {
    Created,
    Failed,
    AuthError,
    NotFound,
}

#[derive(Default)]
struct WatchObserver {
    outcome: Mutex<Option<WatchOutcome>>,
}

impl WatchObserver {
    async fn outcome(&self) -> Option<WatchOutcome> {
        *self.outcome.lock().await
    }

    async fn set(&self, outcome: WatchOutcome) {
        *self.outcome.lock().await = Some(outcome);
    }
}

#[async_trait]
impl TaskObserver for WatchObserver {
    async fn on_status_update(&self, status: &TaskStatus, logs: &[String]) {
        match logs.last() {
            Some(line) => println!("[{status}] {line}"),
            None => println!("[{status}]"),
        }
        if status.is_terminal() {
            let outcome = if *status == TaskStatus::Created {
                WatchOutcome::Created
            } else {
                WatchOutcome::Failed
            };
            self.set(outcome).await;
        }
    }

    async fn on_auth_error(&self) {
        eprintln!("authentication failed; log in again and retry");
        self.set(WatchOutcome::AuthError).await;
    }

    async fn on_not_found(&self) {
        eprintln!("task not found or already expired");
        self.set(WatchOutcome::NotFound).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let task_id = match &cli.command {
        Commands::Watch { id } => TaskId::new(*id),
        Commands::Create { content, session } => {
            let api = ApiClient::new(&cli.endpoint, &cli.token);
            let created = api
                .create_task(content, session.as_deref(), &cli.locale)
                .await?;
            println!(
                "task created: session={} task={}",
                created.session_id, created.message_id
            );
            created.message_id
        }
    };

    watch(&cli, task_id).await
}

async fn watch(cli: &Cli, task_id: TaskId) -> Result<(), Box<dyn std::error::Error>> {
    let observer = Arc::new(WatchObserver::default());
    let config = PollConfig::new(&cli.endpoint, &cli.token).with_locale(&cli.locale);
    let handle = start_polling(task_id, config, observer.clone())?;

    info!(task_id = %task_id, "watching task");
    handle.wait().await;

    match observer.outcome().await {
        Some(WatchOutcome::Created) => Ok(()),
        Some(WatchOutcome::Failed) => std::process::exit(1),
        Some(WatchOutcome::AuthError) => std::process::exit(2),
        Some(WatchOutcome::NotFound) => std::process::exit(3),
        None => std::process::exit(1),
    }
}
