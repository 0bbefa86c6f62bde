//! `kgqa traverse`: run one intent from explicitly named entities.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::{connect, load_config, Neo4jArgs};
use crate::output;
use crate::pipeline::Pipeline;

#[derive(Args)]
pub struct TraverseArgs {
    /// Intent name; unknown names run the general traversal
    #[arg(short, long)]
    pub intent: String,

    /// Entity names to start from
    #[arg(required = true)]
    pub entities: Vec<String>,

    /// Print the subgraph as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: TraverseArgs, config_path: &Path, neo4j: &Neo4jArgs) -> Result<()> {
    let config = load_config(config_path)?;
    if config.intent(&args.intent).is_none() {
        eprintln!(
            "{} unknown intent '{}', using general traversal",
            "warning:".yellow().bold(),
            args.intent
        );
    }

    let client = connect(neo4j).await?;
    let pipeline = Pipeline::new(client, config, None);

    let entry_nodes = pipeline.resolve_entities(&args.entities).await?;
    if entry_nodes.is_empty() {
        anyhow::bail!("None of the entities were found in the graph: {}", args.entities.join(", "));
    }

    let (subgraph, context) = pipeline.traverse(&args.intent, &entry_nodes).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&subgraph)?);
        return Ok(());
    }

    output::print_entry_nodes(&entry_nodes);
    println!();
    output::print_subgraph(&subgraph);
    println!();
    println!("{}", "Context".bold());
    println!("{}", "─".repeat(50));
    println!("{}", context);

    Ok(())
}
