//! `studynotes`: generate study notes and export them as PDF, Word or slides.

mod config;
mod export_cmd;
mod inspect_cmd;
mod page;
mod serve_cmd;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::GeminiArgs;
use export_cmd::NotesSource;
use notes_service::session::{DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS};
use notes_service::{ExportFormat, GeminiClient, GeminiConfig, InMemorySessionStore, NotesService};

#[derive(Parser, Debug)]
#[command(name = "studynotes")]
#[command(author, version, about = "Generate study notes and export them as PDF, Word or slides")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web front end
    Serve {
        /// Address to bind
        #[arg(long, env = "STUDYNOTES_BIND", default_value = "127.0.0.1")]
        bind: String,

        /// Port to listen on
        #[arg(long, env = "STUDYNOTES_PORT", default_value_t = 8000)]
        port: u16,

        /// Sessions kept in memory before the least recently used is dropped
        #[arg(long, env = "STUDYNOTES_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
        max_sessions: usize,

        /// Seconds of inactivity after which a session expires
        #[arg(long, env = "STUDYNOTES_SESSION_TTL", default_value_t = DEFAULT_IDLE_TTL.as_secs())]
        session_ttl: u64,

        #[command(flatten)]
        gemini: GeminiArgs,
    },
    /// Export notes on a topic to a file
    Export {
        /// Topic of the notes (also names the output file)
        #[arg(short, long)]
        topic: String,

        /// Output format: pdf, word or ppt
        #[arg(short, long)]
        format: ExportFormat,

        /// Saved HTML notes to export instead of calling the backend
        #[arg(long, conflicts_with = "text")]
        input: Option<PathBuf>,

        /// Flattened notes text to export instead of calling the backend
        #[arg(long)]
        text: Option<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        gemini: GeminiArgs,
    },
    /// Print the slide titles and body text of a .pptx file
    Inspect {
        /// Presentation to read
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Commands::Serve {
            bind,
            port,
            max_sessions,
            session_ttl,
            gemini,
        } => {
            let config = GeminiConfig::from(gemini);
            if config.api_key.is_none() {
                log::warn!("GEMINI_API_KEY is not set; searches will return a placeholder note");
            }
            let generator = GeminiClient::new(config).context("Failed to create Gemini client")?;
            let store = InMemorySessionStore::with_limits(max_sessions, Duration::from_secs(session_ttl));
            let service = NotesService::new(Arc::new(generator), Arc::new(store));
            serve_cmd::run_serve(service, &bind, port).await?;
        }
        Commands::Export {
            topic,
            format,
            input,
            text,
            output,
            gemini,
        } => {
            let source = match (input, text) {
                (Some(path), _) => NotesSource::Markup(path),
                (None, Some(path)) => NotesSource::Text(path),
                (None, None) => {
                    if gemini.api_key.is_none() {
                        anyhow::bail!("GEMINI_API_KEY is not set; use --input or --text to export saved notes");
                    }
                    let client = GeminiClient::new(gemini.into()).context("Failed to create Gemini client")?;
                    NotesSource::Generate(Arc::new(client))
                }
            };
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            let path = export_cmd::run_export(&topic, format, source, &output_dir).await?;
            println!("Written to: {}", path.display());
        }
        Commands::Inspect { file } => inspect_cmd::run_inspect(&file)?,
    }

    Ok(())
}
