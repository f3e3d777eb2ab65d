//! Prompt templates for grounded chat

use crate::types::QueryHit;

/// System instruction sent with every chat request
pub const SYSTEM_PROMPT: &str = "You answer using only the provided context. \
If the context is insufficient, say you don't know.";

/// Prompt builder for context-grounded questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build a numbered context block from retrieved hits
    pub fn build_context(hits: &[QueryHit]) -> String {
        let mut context = String::new();

        for (i, hit) in hits.iter().enumerate() {
            let source = hit
                .metadata
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or(hit.id.as_str());

            context.push_str(&format!(
                "[{}] {}\n\n{}\n\n---\n\n",
                i + 1,
                source,
                hit.document
            ));
        }

        context
    }

    /// Build the user prompt for a question over retrieved context
    pub fn build_chat_prompt(question: &str, hits: &[QueryHit]) -> String {
        format!(
            "CONTEXT:\n{context}\nQUESTION: {question}\n\nAnswer using only the context above:",
            context = Self::build_context(hits),
            question = question.trim(),
        )
    }
}
