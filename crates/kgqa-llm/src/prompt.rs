//! Prompt text for context-grounded answering.

pub const SYSTEM_PROMPT: &str = "You are a knowledge graph assistant.
Answer the question using ONLY the information provided in the KNOWLEDGE GRAPH CONTEXT below.
Do not use any external knowledge or make assumptions beyond what is stated.
If the context does not contain enough information to answer, say so clearly.";

/// Build the user turn from rendered graph context and the original question.
pub fn user_prompt(context: &str, query: &str) -> String {
    format!(
        "KNOWLEDGE GRAPH CONTEXT:\n{}\n\nQUESTION: {}\n\nANSWER:",
        context.trim_end(),
        query.trim()
    )
}
