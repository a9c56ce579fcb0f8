mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "ipid",
    version,
    about = "Extract structured fields from insurance product information documents (IPID)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that runs the extraction pipeline.
#[derive(clap::Args, Clone)]
pub struct PipelineArgs {
    /// Custom JSON anchor table (default: built-in French IPID table)
    #[arg(long = "anchors", value_name = "FILE", env = "IPID_ANCHORS")]
    pub anchors: Option<PathBuf>,

    /// Rebuild page text from word geometry (pdftotext -bbox)
    #[arg(long, env = "IPID_GEOMETRY")]
    pub geometry: bool,

    /// Tolerance (in points) when grouping words into lines; 0 = exact
    #[arg(long, default_value_t = 0.0, value_name = "POINTS")]
    pub line_tolerance: f32,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an IPID PDF into structured fields
    Parse {
        /// Path to the PDF file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Inspect and validate anchor tables
    Anchors {
        #[command(subcommand)]
        action: AnchorsAction,
    },
    /// Serve the extraction pipeline over HTTP (POST /file)
    Serve {
        /// Address to bind
        #[arg(long, env = "IPID_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 8000)]
        port: u16,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[derive(Subcommand)]
enum AnchorsAction {
    /// List built-in anchor tables
    List,
    /// Show the anchors and field policies of a table
    Show {
        /// Preset name (e.g., "ipid-fr")
        preset: String,
    },
    /// Validate a custom anchor table file
    Validate {
        /// Path to JSON anchor table
        file: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipid=info,ipid_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            pipeline,
        } => commands::parse::run(input_file, &output, out, &pipeline),
        Commands::Anchors { action } => match action {
            AnchorsAction::List => commands::anchors::list(),
            AnchorsAction::Show { preset } => commands::anchors::show(&preset),
            AnchorsAction::Validate { file } => commands::anchors::validate(&file),
        },
        Commands::Serve {
            host,
            port,
            pipeline,
        } => commands::serve::run(&host, port, &pipeline),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
