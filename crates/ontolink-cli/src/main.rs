//! ontolink: ontology-grounded entity linking and evaluation.
//!
//! Results go to stdout; diagnostics go to stderr (see [`logging`]).

mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error};

use ontolink_core::defaults;
use ontolink_search::SemanticMatcherConfig;

use config::{AnchoringArg, InferenceArgs, OracleFailureArg, OutputFormat, ResourceArgs};

#[derive(Parser)]
#[command(name = "ontolink")]
#[command(author, version, about = "Link text to ontology concepts and score the results")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed every surface form and persist the vector index with its labels
    BuildIndex {
        #[command(flatten)]
        resources: ResourceArgs,

        #[command(flatten)]
        inference: InferenceArgs,
    },

    /// Whole-word dictionary matching; writes <output>/<stem>.json per document
    MatchExact {
        /// A .txt document or a directory of them
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        resources: ResourceArgs,
    },

    /// Embedding retrieval with yes/no disambiguation; writes <output>/<stem>_llm.json
    MatchSemantic {
        /// A .txt document or a directory of them
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Nearest surface forms considered per sentence
        #[arg(long, default_value_t = defaults::TOP_K)]
        top_k: usize,

        /// Minimum cosine similarity (inclusive)
        #[arg(long, default_value_t = defaults::SIMILARITY_THRESHOLD)]
        threshold: f32,

        /// Skip the yes/no disambiguation step
        #[arg(long)]
        no_chat: bool,

        /// What to do with a candidate when the chat call fails
        #[arg(long, value_enum, default_value_t = OracleFailureArg::Accept)]
        oracle_failure: OracleFailureArg,

        /// How sentence positions are recovered
        #[arg(long, value_enum, default_value_t = AnchoringArg::Tracked)]
        anchoring: AnchoringArg,

        #[command(flatten)]
        resources: ResourceArgs,

        #[command(flatten)]
        inference: InferenceArgs,
    },

    /// Score predictions against gold annotations
    Evaluate {
        /// Prediction file or directory
        predicted: PathBuf,

        /// Gold file or directory
        gold: PathBuf,

        /// Also report metrics for each document
        #[arg(long)]
        per_doc: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Convert annotations to Web Annotation Turtle
    ExportRdf {
        /// Annotation file or directory
        predictions: PathBuf,

        /// Write Turtle to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Repository URL to POST the Turtle to (`{url}/statements`)
        #[arg(long, value_name = "REPO_URL")]
        upload: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let _log_guard = logging::init();
    debug!(version = env!("CARGO_PKG_VERSION"), "ontolink starting");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::BuildIndex {
            resources,
            inference,
        } => commands::build_index(resources.resolve(), inference.resolve()).await,
        Commands::MatchExact {
            input,
            output,
            resources,
        } => commands::match_exact(&input, &output, &resources.resolve().forms_csv),
        Commands::MatchSemantic {
            input,
            output,
            top_k,
            threshold,
            no_chat,
            oracle_failure,
            anchoring,
            resources,
            inference,
        } => {
            let config = SemanticMatcherConfig {
                top_k,
                threshold,
                disambiguate: !no_chat,
                oracle_failure: oracle_failure.into(),
                anchoring: anchoring.into(),
            };
            commands::match_semantic(
                &input,
                &output,
                resources.resolve(),
                inference.resolve(),
                config,
            )
            .await
        }
        Commands::Evaluate {
            predicted,
            gold,
            per_doc,
            format,
        } => commands::evaluate_paths(&predicted, &gold, per_doc, format),
        Commands::ExportRdf {
            predictions,
            output,
            upload,
        } => commands::export_rdf(&predictions, output.as_deref(), upload.as_deref()).await,
    }
}
