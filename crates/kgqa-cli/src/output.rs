//! Terminal output formatting.

use colored::{ColoredString, Colorize};

use kgqa_core::{EntryNode, Subgraph};

use crate::pipeline::PipelineAnswer;

/// Color a node label by its domain type.
fn label_colored(label: &str) -> ColoredString {
    match label {
        "Drug" => label.cyan(),
        "Disease" => label.magenta(),
        "Symptom" => label.yellow(),
        "SideEffect" => label.red(),
        "Unknown" => label.dimmed(),
        _ => label.blue(),
    }
}

pub fn print_entry_nodes(entry_nodes: &[EntryNode]) {
    if entry_nodes.is_empty() {
        println!("{}", "No entry nodes found.".dimmed());
        return;
    }

    println!("{}", "Entry nodes".bold());
    for node in entry_nodes {
        println!("  {} [{}] {}", "•".dimmed(), label_colored(&node.label), node.name);
    }
}

/// Print a subgraph as a node list followed by its edges.
pub fn print_subgraph(subgraph: &Subgraph) {
    println!(
        "{} {} (depth={}, {} nodes, {} edges)",
        "Subgraph".bold(),
        subgraph.strategy.cyan(),
        subgraph.hop_depth,
        subgraph.node_count(),
        subgraph.relationship_count()
    );
    println!("{}", "─".repeat(50));

    if subgraph.is_empty() {
        println!("{}", "Nothing found.".dimmed());
        return;
    }

    for node in subgraph.nodes() {
        println!("  [{}] {}", label_colored(&node.label), node.name);
    }

    if subgraph.relationship_count() > 0 {
        println!();
        for rel in subgraph.relationships() {
            println!(
                "  {} {} {} {}",
                subgraph.display_name(&rel.source_id),
                rel.rel_type.yellow(),
                "→".dimmed(),
                subgraph.display_name(&rel.target_id)
            );
        }
    }
}

pub fn print_answer(result: &PipelineAnswer) {
    println!("{} {}", "Question:".bold(), result.question);
    println!("{} {}", "Intent:".bold(), result.intent.cyan());
    println!();
    print_entry_nodes(&result.entry_nodes);
    println!();
    print_subgraph(&result.subgraph);

    match &result.answer {
        Some(answer) => {
            println!();
            println!("{}", "Answer".green().bold());
            println!("{}", "─".repeat(50));
            println!("{}", answer);
        }
        None => {
            println!();
            println!("{}", "Context".bold());
            println!("{}", "─".repeat(50));
            println!("{}", result.context);
        }
    }
}
