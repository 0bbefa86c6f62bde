//! `kgqa status`: graph and model reachability.

use anyhow::Result;
use colored::Colorize;

use super::{connect, LlmArgs, Neo4jArgs};

pub async fn cmd_status(neo4j: &Neo4jArgs, llm: &LlmArgs) -> Result<()> {
    println!("{}", "Knowledge Graph Status".bold());
    println!("{}", "─".repeat(40));

    match connect(neo4j).await {
        Ok(client) => {
            let counts = client.get_counts().await?;
            println!("  Neo4j:         {} ({})", "connected".green(), neo4j.uri);
            println!("  Nodes:         {}", counts.nodes);
            println!("  Relationships: {}", counts.relationships);
        }
        Err(e) => {
            println!("  Neo4j:         {} ({})", "unavailable".red(), neo4j.uri);
            println!("  {}", format!("{:#}", e).dimmed());
        }
    }

    let client = llm.client();
    let model_ready = client.health_check().await.unwrap_or(false);
    let model_status = if model_ready {
        "available".green()
    } else {
        "unavailable".red()
    };
    println!("  Model:         {} {} ({})", client.model(), model_status, llm.ollama_url);

    Ok(())
}
