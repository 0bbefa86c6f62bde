//! Configuration-only commands: classify, intents, check.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use kgqa_core::intent::IntentClassifier;
use kgqa_core::GENERAL_INTENT;

use super::load_config;

/// Show which intent a question maps to and how it would traverse.
pub fn cmd_classify(config_path: &Path, question: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let classifier = IntentClassifier::new(&config);
    let intent = classifier.classify(question);

    let definition = match config.intent(intent) {
        Some(definition) => definition.clone(),
        None => config.general_intent(),
    };
    let strategy = definition.resolve()?;

    println!("{}: {}", "Intent".bold(), intent.cyan());
    println!(
        "{}: {} (max depth {})",
        "Strategy".bold(),
        strategy.name().yellow(),
        strategy.max_depth()
    );
    if intent == GENERAL_INTENT {
        println!("{}", "No keyword matched; general 1-hop exploration.".dimmed());
        println!(
            "{} {}",
            "Known intents:".dimmed(),
            classifier.all_intents().join(", ").dimmed()
        );
    }

    Ok(())
}

/// List configured intents in matching order.
pub fn cmd_list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("{:<20} {:<16} {}", "Intent", "Strategy", "Keywords");
    println!("{}", "─".repeat(70));

    for intent in &config.intents {
        println!(
            "{:<20} {:<16} {}",
            intent.name.cyan(),
            intent.definition.strategy.yellow(),
            intent.definition.keywords.join(", ").dimmed()
        );
    }
    println!(
        "{:<20} {:<16} {}",
        GENERAL_INTENT.cyan(),
        "variable_hop".yellow(),
        "(fallback)".dimmed()
    );

    Ok(())
}

/// Validate the configuration document and summarize it.
pub fn cmd_check(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    for intent in &config.intents {
        let strategy = intent.definition.resolve()?;
        println!(
            "  {} {} {} (depth {})",
            "✓".green(),
            intent.name,
            strategy.name().dimmed(),
            strategy.max_depth()
        );
    }

    println!(
        "\n{} {} intents, {} relationship templates",
        "Configuration valid:".green().bold(),
        config.intents.len(),
        config.relationship_templates.len()
    );

    Ok(())
}
