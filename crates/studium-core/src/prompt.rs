//! Prompt assembly for grounded answering
//!
//! Builds the context block from retrieved chunks, the grounding prompt for
//! the generation model, and the two deterministic answers (no documents
//! retrieved; generation unavailable).

use crate::types::RetrievedChunk;

/// Separator between chunks in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Returned when retrieval finds nothing for the owner. A successful
/// outcome, not an error; the generation model is never consulted.
pub const NO_DOCUMENTS_ANSWER: &str = "I don't have any documents uploaded yet that relate to \
your question. Please upload relevant course materials, and I'll be able to help you better!";

/// How many retrieved chunks the degraded answer quotes verbatim
const DEGRADED_ANSWER_CHUNKS: usize = 2;

/// Build the context block: each chunk prefixed with its source name,
/// separated clearly, in ranked order.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| format!("[Source: {}]\n{}", chunk.metadata.source_name, chunk.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Build the grounding prompt for the generation model.
///
/// Instructs the model to answer only from the supplied context, cite the
/// source documents, admit when the context is insufficient, and answer in
/// structured prose.
pub fn build_grounding_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are an AI academic assistant helping a student with their coursework. Use the provided context from their uploaded documents to answer their question accurately and helpfully.

IMPORTANT RULES:
- Answer based ONLY on the context provided below
- If the context doesn't contain enough information, say "I don't have enough information in your uploaded documents to fully answer that question"
- Cite which document(s) the information comes from in your answer
- Structure your response clearly with proper paragraphs
- Be educational and concise
- Use bullet points or numbered lists when appropriate

---CONTEXT FROM STUDENT'S DOCUMENTS---
{context}

---STUDENT'S QUESTION---
{question}

---INSTRUCTIONS---
Provide a well-structured, clear answer based on the context above. Start directly with the answer without preamble."#
    )
}

/// Deterministic fallback assembled from the top retrieved chunks when the
/// generation model fails. A recoverable degradation, never an error.
pub fn build_degraded_answer(chunks: &[RetrievedChunk]) -> String {
    let excerpts = chunks
        .iter()
        .take(DEGRADED_ANSWER_CHUNKS)
        .map(|chunk| format!("**From {}:**\n{}", chunk.metadata.source_name, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "I couldn't generate a full answer right now. Here's what I found in your documents:\n\n\
         {excerpts}\n\n\
         *Note: answer generation is temporarily unavailable; the excerpts above are quoted \
         verbatim from your documents.*"
    )
}

/// Distinct source names across `chunks`, in order of first appearance
pub fn distinct_sources(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for chunk in chunks {
        if !sources.contains(&chunk.metadata.source_name) {
            sources.push(chunk.metadata.source_name.clone());
        }
    }
    sources
}
