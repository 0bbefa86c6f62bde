//! CLI command definitions and handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use kgqa_core::DomainConfig;
use kgqa_graph::{GraphClient, GraphConfig};
use kgqa_llm::OllamaClient;

pub mod ask;
pub mod graph;
pub mod intents;
pub mod traverse;

/// Answer questions from a Neo4j knowledge graph
#[derive(Parser)]
#[command(name = "kgqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Domain configuration document
    #[arg(
        short,
        long,
        global = true,
        env = "KGQA_CONFIG",
        default_value = "config/medical_graph.json"
    )]
    pub config: PathBuf,

    /// Also append logs to this file
    #[arg(long, global = true, env = "KGQA_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub neo4j: Neo4jArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Neo4j connection settings.
#[derive(Args, Debug, Clone)]
pub struct Neo4jArgs {
    /// Bolt URI
    #[arg(long = "neo4j-uri", env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    pub uri: String,

    #[arg(long = "neo4j-user", env = "NEO4J_USER", default_value = "neo4j")]
    pub user: String,

    #[arg(
        long = "neo4j-password",
        env = "NEO4J_PASSWORD",
        default_value = "neo4j",
        hide_env_values = true
    )]
    pub password: String,

    #[arg(long = "neo4j-database", env = "NEO4J_DATABASE", default_value = "neo4j")]
    pub database: String,
}

impl Neo4jArgs {
    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            uri: self.uri.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            ..GraphConfig::default()
        }
    }
}

/// Answer generation settings.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// Ollama API URL
    #[arg(long, env = "OLLAMA_URL", default_value = kgqa_llm::ollama::DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Generation model
    #[arg(long, env = "KGQA_MODEL", default_value = kgqa_llm::ollama::DEFAULT_MODEL)]
    pub model: String,
}

impl LlmArgs {
    pub fn client(&self) -> OllamaClient {
        OllamaClient::new(&self.ollama_url, &self.model)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Answer a question from the knowledge graph
    Ask(ask::AskArgs),

    /// Run one intent's traversal from named entities
    Traverse(traverse::TraverseArgs),

    /// Show which intent a question maps to
    Classify {
        /// Question text
        question: String,
    },

    /// List configured intents
    Intents,

    /// Show graph and model status
    Status,

    /// Validate the domain configuration
    Check,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Ask(args) => ask::execute(args, &self.config, &self.neo4j, &self.llm).await,
            Commands::Traverse(args) => traverse::execute(args, &self.config, &self.neo4j).await,
            Commands::Classify { question } => intents::cmd_classify(&self.config, &question),
            Commands::Intents => intents::cmd_list(&self.config),
            Commands::Status => graph::cmd_status(&self.neo4j, &self.llm).await,
            Commands::Check => intents::cmd_check(&self.config),
        }
    }
}

/// Load and validate the domain configuration.
pub(crate) fn load_config(path: &Path) -> Result<Arc<DomainConfig>> {
    let config = DomainConfig::load(path)
        .with_context(|| format!("Failed to load domain config {}", path.display()))?;
    Ok(Arc::new(config))
}

pub(crate) async fn connect(args: &Neo4jArgs) -> Result<GraphClient> {
    GraphClient::connect(&args.graph_config())
        .await
        .with_context(|| format!("Cannot reach Neo4j at {}", args.uri))
}
