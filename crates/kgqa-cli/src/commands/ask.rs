//! `kgqa ask`: answer a question end to end.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::{connect, load_config, LlmArgs, Neo4jArgs};
use crate::output;
use crate::pipeline::Pipeline;

#[derive(Args)]
pub struct AskArgs {
    /// Question text
    pub question: String,

    /// Only retrieve and print the graph context
    #[arg(long)]
    pub no_llm: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AskArgs, config_path: &Path, neo4j: &Neo4jArgs, llm: &LlmArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let client = connect(neo4j).await?;
    let answerer = if args.no_llm { None } else { Some(llm.client()) };

    let pipeline = Pipeline::new(client, config, answerer);
    let result = pipeline.ask(&args.question).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_answer(&result);
    }

    Ok(())
}
