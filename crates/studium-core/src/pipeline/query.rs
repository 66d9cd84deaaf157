//! Query pipeline: retrieve owner-scoped chunks and ground a generated answer

use super::RagEngine;
use crate::error::RagError;
use crate::filter::Filter;
use crate::prompt::{
    build_context, build_degraded_answer, build_grounding_prompt, distinct_sources,
    NO_DOCUMENTS_ANSWER,
};
use crate::types::RagAnswer;

impl RagEngine {
    /// Answer `question` from the owner's ingested documents.
    ///
    /// Retrieval is always scoped to `owner_id`; a caller can never see
    /// another owner's chunks. Zero retrieved chunks is a successful outcome
    /// with a canned answer, and a generation failure is downgraded to a
    /// deterministic excerpt-based answer - neither surfaces as an error.
    pub async fn answer(&self, owner_id: &str, question: &str) -> Result<RagAnswer, RagError> {
        if question.trim().is_empty() {
            return Err(RagError::Validation("question must not be empty".to_string()));
        }

        // Same embedding space as ingestion: the one injected provider.
        let query_embedding = self.embedder.embed(question).await?;

        let results = self
            .store
            .query(&query_embedding, self.top_k, &Filter::for_owner(owner_id))
            .await?;

        if results.is_empty() {
            log::debug!("No chunks matched for owner {}", owner_id);
            return Ok(RagAnswer {
                answer: NO_DOCUMENTS_ANSWER.to_string(),
                sources: Vec::new(),
                chunk_count: 0,
            });
        }

        let context = build_context(&results);
        let prompt = build_grounding_prompt(&context, question);

        let answer = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                // Recoverable degradation: answer from the retrieved text.
                log::warn!("Generation failed, returning degraded answer: {}", e);
                build_degraded_answer(&results)
            }
        };

        Ok(RagAnswer {
            answer,
            sources: distinct_sources(&results),
            chunk_count: results.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{default_engine, engine_with, HashEmbedder, MockGenerator};
    use crate::error::RagError;
    use crate::prompt::NO_DOCUMENTS_ANSWER;

    #[tokio::test]
    async fn answer_cites_the_ingested_source() {
        let (engine, _, _, _) = default_engine();
        engine
            .ingest(
                "alice",
                vec!["The deadline for Assignment 2 is March 5.".to_string()],
                "syllabus.txt",
            )
            .await
            .unwrap();

        let answer = engine
            .answer("alice", "When is assignment 2 due?")
            .await
            .unwrap();
        assert_eq!(answer.sources, vec!["syllabus.txt"]);
        assert_eq!(answer.chunk_count, 1);
        assert!(answer.answer.contains("March 5"));
    }

    #[tokio::test]
    async fn empty_question_is_a_validation_error() {
        let (engine, _, _, _) = default_engine();
        for question in ["", "   ", "\n\t"] {
            let err = engine.answer("alice", question).await.unwrap_err();
            assert!(matches!(err, RagError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn no_documents_returns_canned_answer_without_generation() {
        let (engine, _, generator, _) = default_engine();

        let answer = engine.answer("alice", "When is the exam?").await.unwrap();
        assert_eq!(answer.answer, NO_DOCUMENTS_ANSWER);
        assert!(answer.sources.is_empty());
        assert_eq!(answer.chunk_count, 0);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn generation_failure_degrades_instead_of_erroring() {
        let (engine, _, generator, _) =
            engine_with(HashEmbedder::new(), MockGenerator::failing());
        engine
            .ingest(
                "alice",
                vec!["Office hours are Tuesdays at 3pm.".to_string()],
                "logistics.txt",
            )
            .await
            .unwrap();

        let answer = engine.answer("alice", "When are office hours?").await.unwrap();
        assert_eq!(generator.call_count(), 1);
        assert!(answer.answer.contains("Office hours are Tuesdays at 3pm."));
        assert!(answer.answer.contains("logistics.txt"));
        assert!(answer.answer.contains("temporarily unavailable"));
        assert_eq!(answer.sources, vec!["logistics.txt"]);
        assert_eq!(answer.chunk_count, 1);
    }

    #[tokio::test]
    async fn answer_never_sees_another_owners_chunks() {
        let (engine, _, _, _) = default_engine();
        engine
            .ingest("bob", vec!["Bob's secret notes.".to_string()], "notes.txt")
            .await
            .unwrap();

        let answer = engine.answer("alice", "What do the notes say?").await.unwrap();
        assert_eq!(answer.answer, NO_DOCUMENTS_ANSWER);
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn sources_are_distinct_in_first_appearance_order() {
        let (engine, _, _, _) = default_engine();
        engine
            .ingest(
                "alice",
                vec!["lecture one alpha".to_string(), "lecture one beta".to_string()],
                "lectures.txt",
            )
            .await
            .unwrap();
        engine
            .ingest("alice", vec!["reading gamma".to_string()], "readings.txt")
            .await
            .unwrap();

        let answer = engine.answer("alice", "alpha beta gamma?").await.unwrap();
        assert_eq!(answer.chunk_count, 3);
        assert_eq!(answer.sources.len(), 2);
        let mut sorted = answer.sources.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["lectures.txt", "readings.txt"]);
    }

    #[tokio::test]
    async fn retrieval_is_capped_at_top_k() {
        let (engine, _, _, _) = default_engine();
        let chunks: Vec<String> = (0..12).map(|i| format!("chunk number {i}")).collect();
        engine.ingest("alice", chunks, "big.txt").await.unwrap();

        let answer = engine.answer("alice", "chunk number").await.unwrap();
        assert_eq!(answer.chunk_count, 5);
    }
}
