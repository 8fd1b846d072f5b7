use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use easel_editor::{load_config, load_script, EditorConfig, EditorSession};
use easel_project::{
    FileProjectStore, ManualClock, ProjectRecord, ProjectStore, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

#[derive(Parser)]
#[command(name = "easel")]
#[command(about = "Headless driver for easel design projects", version)]
struct Cli {
    /// Directory holding project files
    #[arg(long, global = true, default_value = "projects")]
    store: PathBuf,

    /// Editor config (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project
    New {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: f32,
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: f32,
    },
    /// Replay an edit script against a project and save the result
    Replay { project: Uuid, script: PathBuf },
    /// Print a stored project
    Show { project: Uuid },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut store = FileProjectStore::new(&cli.store);

    match cli.command {
        Commands::New {
            name,
            width,
            height,
        } => {
            let record = ProjectRecord::new(name, width, height)?;
            store.create_project(&record)?;
            println!("{}", record.id);
        }
        Commands::Replay { project, script } => {
            let config = match &cli.config {
                Some(path) => load_config(path)?,
                None => EditorConfig::default(),
            };
            let steps = load_script(&script)?;
            let record = store.load_project(project)?;

            let mut session = EditorSession::open(record, &mut store, ManualClock::new(), config)
                .context("open project")?;
            let report = session.replay(&steps)?;
            session.close()?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Show { project } => {
            let record = store.load_project(project)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
