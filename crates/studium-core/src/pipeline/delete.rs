//! Deletion pipeline: remove a document's chunks under owner+name scoping

use super::RagEngine;
use crate::error::RagError;
use crate::filter::Filter;

impl RagEngine {
    /// Delete all of `owner_id`'s chunks for `source_name`.
    ///
    /// Returns how many chunks were removed; zero matches is a normal
    /// outcome, not an error. The filter carries both the owner and source
    /// predicates, so an identically named document belonging to another
    /// owner is never touched.
    pub async fn delete(&self, owner_id: &str, source_name: &str) -> Result<usize, RagError> {
        let filter = Filter::for_owner(owner_id).with_source(source_name);
        let candidates = self.store.get_by_filter(&filter).await?;
        if candidates.is_empty() {
            log::debug!("No chunks found for owner {} source {}", owner_id, source_name);
            return Ok(0);
        }

        let ids: Vec<String> = candidates.into_iter().map(|(id, _)| id).collect();
        let count = ids.len();
        self.store.delete_by_ids(&ids).await?;

        log::info!("Deleted {} chunks for owner {} source {}", count, owner_id, source_name);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::default_engine;
    use crate::filter::Filter;
    use crate::prompt::NO_DOCUMENTS_ANSWER;
    use crate::store::VectorStore;

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn delete_removes_all_chunks_for_the_source() {
        let (engine, _, _, _) = default_engine();
        engine
            .ingest(
                "alice",
                chunks(&["The deadline for Assignment 2 is March 5.", "Late policy: 10% per day."]),
                "syllabus.txt",
            )
            .await
            .unwrap();

        let deleted = engine.delete("alice", "syllabus.txt").await.unwrap();
        assert_eq!(deleted, 2);

        let answer = engine
            .answer("alice", "When is assignment 2 due?")
            .await
            .unwrap();
        assert_eq!(answer.answer, NO_DOCUMENTS_ANSWER);
        assert!(answer.sources.is_empty());
    }

    #[tokio::test]
    async fn delete_with_no_matches_returns_zero() {
        let (engine, _, _, _) = default_engine();
        assert_eq!(engine.delete("alice", "missing.txt").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_only_touches_the_named_source() {
        let (engine, _, _, store) = default_engine();
        engine
            .ingest("alice", chunks(&["keep me"]), "keep.txt")
            .await
            .unwrap();
        engine
            .ingest("alice", chunks(&["drop me"]), "drop.txt")
            .await
            .unwrap();

        assert_eq!(engine.delete("alice", "drop.txt").await.unwrap(), 1);

        let remaining = store
            .get_by_filter(&Filter::for_owner("alice"))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].1.source_name, "keep.txt");
    }

    #[tokio::test]
    async fn deletion_never_crosses_tenants() {
        let (engine, _, _, store) = default_engine();
        engine
            .ingest("alice", chunks(&["alice chunk one", "alice chunk two"]), "notes.txt")
            .await
            .unwrap();
        engine
            .ingest("bob", chunks(&["bob chunk one", "bob chunk two", "bob chunk three"]), "notes.txt")
            .await
            .unwrap();

        // Alice deletes her "notes.txt"; Bob's identically named document
        // must be unchanged.
        assert_eq!(engine.delete("alice", "notes.txt").await.unwrap(), 2);

        let bobs = store.get_by_filter(&Filter::for_owner("bob")).await.unwrap();
        assert_eq!(bobs.len(), 3);
    }

    #[tokio::test]
    async fn delete_removes_all_generations_of_a_reingested_source() {
        let (engine, _, _, _) = default_engine();
        engine
            .ingest("alice", chunks(&["v1"]), "notes.txt")
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        engine
            .ingest("alice", chunks(&["v2"]), "notes.txt")
            .await
            .unwrap();

        assert_eq!(engine.delete("alice", "notes.txt").await.unwrap(), 2);
        assert_eq!(engine.delete("alice", "notes.txt").await.unwrap(), 0);
    }
}
