//! Metadata filters for vector store queries and deletions
//!
//! A single logical collection holds every owner's chunks, so tenant
//! isolation rests entirely on filter scoping. [`Filter`] is constructible
//! only through [`Filter::for_owner`], which makes the owner predicate a
//! property of the type rather than a convention call sites must remember.

use crate::types::ChunkMetadata;

/// Metadata fields that can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    OwnerId,
    SourceName,
}

impl MetadataField {
    /// Column name in the persistent store schema
    pub fn column(&self) -> &'static str {
        match self {
            MetadataField::OwnerId => "owner_id",
            MetadataField::SourceName => "source_name",
        }
    }
}

/// A single equality predicate on a metadata field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals { field: MetadataField, value: String },
}

impl Predicate {
    pub fn equals(field: MetadataField, value: impl Into<String>) -> Self {
        Predicate::Equals {
            field,
            value: value.into(),
        }
    }

    fn matches(&self, meta: &ChunkMetadata) -> bool {
        match self {
            Predicate::Equals { field, value } => match field {
                MetadataField::OwnerId => meta.owner_id == *value,
                MetadataField::SourceName => meta.source_name == *value,
            },
        }
    }

    fn to_sql(&self) -> String {
        match self {
            Predicate::Equals { field, value } => {
                format!("{} = '{}'", field.column(), escape_sql(value))
            }
        }
    }
}

/// A conjunction of equality predicates, always including the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Start a filter scoped to one owner. This is the only constructor, so
    /// every filter that reaches a store carries the owner predicate.
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            predicates: vec![Predicate::equals(MetadataField::OwnerId, owner_id)],
        }
    }

    /// Additionally restrict to one source document
    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.predicates
            .push(Predicate::equals(MetadataField::SourceName, source_name));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// In-process evaluation, used by the memory store
    pub fn matches(&self, meta: &ChunkMetadata) -> bool {
        self.predicates.iter().all(|p| p.matches(meta))
    }

    /// Render as a SQL boolean expression for LanceDB's `only_if`
    pub fn to_sql(&self) -> String {
        self.predicates
            .iter()
            .map(Predicate::to_sql)
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Escape a string literal for embedding in a SQL predicate
fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}
