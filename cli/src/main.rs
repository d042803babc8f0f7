//! # DocMentor CLI (`docmentor`)
//!
//! Ask questions about your own documents, answered by a local Ollama model.
//!
//! ```bash
//! docmentor ingest lecture.pdf notes.txt
//! docmentor ask "What is the Calvin cycle?" --model smart --explain
//! docmentor suggest --style factual
//! docmentor glossary set ATP "Adenosine triphosphate, the cell's energy currency"
//! ```
//!
//! All state (embedding index, glossary, query history, exports) lives under the
//! configured data directory. Logs go to stderr; set `RUST_LOG` to change verbosity.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use docmentor_core::error::AppError;
use docmentor_core::export::ExportFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docmentor",
    version,
    about = "Local retrieval-augmented question answering over your documents"
)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed and index documents (.txt, .pdf, .docx).
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a question about the indexed documents.
    Ask {
        question: String,

        /// Answer model: display name, tag, or one of `fast`, `smart`, `reasoning`.
        #[arg(long)]
        model: Option<String>,

        /// Do not list the sources of the retrieved chunks.
        #[arg(long)]
        hide_chunks: bool,

        /// Ask the model to explain why its answer is correct.
        #[arg(long)]
        explain: bool,

        /// Do not add the glossary definition of the question to the prompt.
        #[arg(long)]
        no_glossary_note: bool,

        /// Also print the full retrieved context.
        #[arg(long)]
        full_context: bool,

        /// Export the answer into the exports directory.
        #[arg(long, value_enum)]
        export: Option<ExportKind>,

        /// Add a citation footer to the export.
        #[arg(long)]
        citations: bool,
    },

    /// Suggest study questions about recently indexed material.
    Suggest {
        /// insightful, factual, multiple-choice or open-ended.
        #[arg(long, default_value = "insightful")]
        style: String,

        /// Immediately answer the N-th suggested question (1-based).
        #[arg(long)]
        answer: Option<usize>,
    },

    /// Edit or inspect the glossary.
    Glossary {
        #[command(subcommand)]
        action: GlossaryAction,
    },

    /// Print the query history.
    History,

    /// Per-document chunk counts in the index.
    Stats,

    /// Check that the local Ollama server is reachable.
    Health,
}

#[derive(Subcommand)]
enum GlossaryAction {
    /// Add or replace a definition.
    Set { term: String, definition: String },
    /// Print the whole glossary as JSON.
    Show,
    /// List terms related to a partial query.
    Suggest { query: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Txt,
    Pdf,
}

impl From<ExportKind> for ExportFormat {
    fn from(k: ExportKind) -> Self {
        match k {
            ExportKind::Txt => ExportFormat::Txt,
            ExportKind::Pdf => ExportFormat::Pdf,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let cfg = commands::load(cli.config.as_deref())?;
    let out = commands::Output { json: cli.json };

    match cli.command {
        Commands::Ingest { files } => commands::ingest(&cfg, &out, &files),
        Commands::Ask {
            question,
            model,
            hide_chunks,
            explain,
            no_glossary_note,
            full_context,
            export,
            citations,
        } => commands::ask(
            &cfg,
            &out,
            commands::AskArgs {
                question,
                model,
                show_chunks: !hide_chunks,
                explain,
                glossary_note: !no_glossary_note,
                full_context,
                export: export.map(ExportFormat::from),
                citations,
            },
        ),
        Commands::Suggest { style, answer } => commands::suggest(&cfg, &out, &style, answer),
        Commands::Glossary { action } => match action {
            GlossaryAction::Set { term, definition } => {
                commands::glossary_set(&cfg, &out, &term, &definition)
            }
            GlossaryAction::Show => commands::glossary_show(&cfg),
            GlossaryAction::Suggest { query } => commands::glossary_suggest(&cfg, &out, &query),
        },
        Commands::History => commands::history(&cfg, &out),
        Commands::Stats => commands::stats(&cfg, &out),
        Commands::Health => commands::health(&cfg, &out),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = %e.code, retryable = e.retryable, "command failed");
            eprintln!("error: {}", commands::render_error(&e));
            ExitCode::FAILURE
        }
    }
}
