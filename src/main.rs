use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use pipeline_desk::app::{AppContext, Session, TracingNotifier};
use pipeline_desk::backend::{HttpRecordClient, RecordClient, StoreRecordClient};
use pipeline_desk::config::{credentials, database, settings};
use pipeline_desk::core::{CrmServices, seed_demo_data};
use pipeline_desk::errors::Result;
use pipeline_desk::schema::{DealStage, RecordId};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// A small CRM over a record backend
#[derive(Debug, Parser)]
#[command(name = "pipeline-desk", version, about)]
struct Cli {
    /// Settings file (defaults to ./pipeline-desk.toml when present)
    #[arg(long, env = "PIPELINE_DESK_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a page: /, /contacts, /deals, /quotes, /companies or /tasks
    Show {
        #[arg(default_value = "/")]
        path: String,
        /// Filter the list by this term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the deal pipeline board
    Pipeline,
    /// Show the activity feed
    Activity {
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Move a deal to another stage
    MoveDeal { id: i64, stage: DealStage },
    /// Fill an empty store with demo records
    Seed,
    /// Delete a record listed on a page
    Delete {
        path: String,
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer).is_ok()
        && matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn run<C: RecordClient>(command: Command, services: CrmServices<C>, session: Session) -> Result<()> {
    if let Command::Seed = command {
        let report = seed_demo_data(&services).await?;
        println!("Created {} record(s)", report.total());
        return Ok(());
    }

    let context = AppContext::new(services, session, Arc::new(TracingNotifier));
    match command {
        Command::Show { path, search } => println!("{}", context.show(&path, search.as_deref()).await?),
        Command::Pipeline => println!("{}", context.pipeline().await?),
        Command::Activity { limit } => println!("{}", context.activity(limit).await?),
        Command::MoveDeal { id, stage } => {
            context.move_deal(RecordId(id), stage).await?;
            println!("Deal {id} moved to {}", stage.label());
        }
        Command::Delete { path, id, yes } => {
            let deleted = if yes {
                context.delete(&path, RecordId(id), &|_: &str| true).await?
            } else {
                context.delete(&path, RecordId(id), &confirm_on_stdin).await?
            };
            if !deleted {
                println!("Nothing was deleted");
            }
        }
        Command::Seed => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Tracing first, so configuration problems are visible
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // 2. .env is optional; variables may be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Settings file
    let app_settings = match &cli.settings {
        Some(path) => settings::load_settings(path),
        None => settings::load_default_settings(),
    }
    .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    let page_size = app_settings.listing.page_size;

    // 4. Backend client, built once and shared by every service
    match app_settings.backend {
        settings::BackendSettings::Local { database_url } => {
            let url = database::get_database_url(database_url.as_deref());
            let db = database::create_connection(&url)
                .await
                .inspect_err(|e| error!("Failed to open local store: {}", e))?;
            database::create_tables(&db).await?;
            info!("Using local store");
            let services = CrmServices::new(Arc::new(StoreRecordClient::new(db)), page_size);
            run(cli.command, services, Session::signed_in("local user")).await
        }
        settings::BackendSettings::Remote { api_url } => {
            let credentials = credentials::from_env()?;
            let session = Session::for_project(&credentials);
            info!("Using hosted backend at {}", api_url);
            let services = CrmServices::new(Arc::new(HttpRecordClient::new(&api_url, credentials)), page_size);
            run(cli.command, services, session).await
        }
    }
}
