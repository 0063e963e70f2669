//! Resource locations and inference settings assembled from flags and env.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use ontolink_core::defaults;
use ontolink_inference::OpenAIConfig;
use ontolink_search::{OracleFailurePolicy, SentenceAnchoring};

/// Where the surface forms, index blob, and labels file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    pub forms_csv: PathBuf,
    pub index: PathBuf,
    pub labels: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            forms_csv: PathBuf::from(defaults::FORMS_CSV),
            index: PathBuf::from(defaults::INDEX_PATH),
            labels: PathBuf::from(defaults::LABELS_PATH),
        }
    }
}

/// Resource path overrides shared by several subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct ResourceArgs {
    /// Surface-form CSV with `uri` and `form` columns
    #[arg(long, value_name = "CSV")]
    pub forms: Option<PathBuf>,

    /// Vector index blob
    #[arg(long, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Labels file stored next to the index
    #[arg(long, value_name = "PATH")]
    pub labels: Option<PathBuf>,
}

impl ResourceArgs {
    pub fn resolve(self) -> ResourcePaths {
        let base = ResourcePaths::default();
        ResourcePaths {
            forms_csv: self.forms.unwrap_or(base.forms_csv),
            index: self.index.unwrap_or(base.index),
            labels: self.labels.unwrap_or(base.labels),
        }
    }
}

/// Inference endpoint overrides. Unset flags fall back to `ONTOLINK_*`
/// environment variables, then to the built-in defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct InferenceArgs {
    /// OpenAI-compatible API root
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Bearer token for the API
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Embedding model name
    #[arg(long, value_name = "MODEL")]
    pub embed_model: Option<String>,

    /// Chat model name used for disambiguation
    #[arg(long, value_name = "MODEL")]
    pub chat_model: Option<String>,
}

impl InferenceArgs {
    pub fn resolve(self) -> OpenAIConfig {
        let mut config = OpenAIConfig::from_env();
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(api_key) = self.api_key {
            config.api_key = Some(api_key);
        }
        if let Some(model) = self.embed_model {
            config.embed_model = model;
        }
        if let Some(model) = self.chat_model {
            config.chat_model = model;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnchoringArg {
    /// Use the span reported by the sentence segmenter
    Tracked,
    /// Use the first occurrence of the sentence text in the document
    FirstOccurrence,
}

impl From<AnchoringArg> for SentenceAnchoring {
    fn from(arg: AnchoringArg) -> Self {
        match arg {
            AnchoringArg::Tracked => SentenceAnchoring::Tracked,
            AnchoringArg::FirstOccurrence => SentenceAnchoring::FirstOccurrence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OracleFailureArg {
    /// Keep the candidate when the oracle fails
    Accept,
    /// Drop the candidate when the oracle fails
    Reject,
}

impl From<OracleFailureArg> for OracleFailurePolicy {
    fn from(arg: OracleFailureArg) -> Self {
        match arg {
            OracleFailureArg::Accept => OracleFailurePolicy::Accept,
            OracleFailureArg::Reject => OracleFailurePolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output file for a document: `<out_dir>/<stem><suffix>.json`.
pub fn output_path(out_dir: &Path, doc_path: &Path, suffix: &str) -> PathBuf {
    let stem = doc_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!(
        "{}{}.{}",
        stem,
        suffix,
        defaults::ANNOTATION_EXTENSION
    ))
}
