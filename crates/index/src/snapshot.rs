use std::collections::HashSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use semantic::{Embedder, EmbeddingVector};
use serde::Serialize;

use crate::{CatalogRecord, IndexError, Item};

/// Counters describing what happened to the records handed to [`CatalogIndex::build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Records received.
    pub records: usize,
    /// Items that made it into the index.
    pub indexed: usize,
    /// Records dropped for a missing or blank id.
    pub missing_id: usize,
    /// Records dropped because an earlier record had the same id.
    pub duplicate_id: usize,
    /// Items excluded because their text pooled to a zero-norm vector.
    pub degenerate: usize,
    pub elapsed_ms: u64,
}

/// Items and their vectors, positionally aligned and read-only once built.
///
/// Every vector has the same dimensionality. A catalog snapshot is replaced
/// wholesale (see [`CatalogHandle`](crate::CatalogHandle)), never mutated.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    items: Vec<Item>,
    vectors: Vec<EmbeddingVector>,
    dimension: Option<usize>,
    normalized: bool,
    built_at: DateTime<Utc>,
    stats: BuildStats,
}

impl CatalogIndex {
    /// An index with no items.
    pub fn empty(normalized: bool) -> Self {
        Self {
            items: Vec::new(),
            vectors: Vec::new(),
            dimension: None,
            normalized,
            built_at: Utc::now(),
            stats: BuildStats::default(),
        }
    }

    /// Embed every record and assemble a complete index.
    ///
    /// Records without an id are dropped, and so are repeats of an id already
    /// seen (first one wins). Up to `concurrency` embedding calls run at once;
    /// catalog order is preserved regardless. Items whose text is degenerate
    /// are excluded and counted. Any other embedding failure, or a vector whose
    /// width disagrees with the rest, aborts the build and nothing is returned.
    pub async fn build<I>(
        records: I,
        embedder: &Embedder,
        concurrency: usize,
    ) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        let started = Instant::now();
        let mut stats = BuildStats::default();
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for record in records {
            stats.records += 1;
            let Some(item) = record.into_item() else {
                stats.missing_id += 1;
                tracing::warn!(record = stats.records - 1, "catalog record without id skipped");
                continue;
            };
            if !seen.insert(item.id.clone()) {
                stats.duplicate_id += 1;
                tracing::warn!(id = %item.id, "duplicate catalog id skipped");
                continue;
            }
            candidates.push(item);
        }

        let mut embedded = stream::iter(candidates.into_iter().map(|item| async move {
            let text = item.search_text();
            let result = embedder.embed(&text).await;
            (item, result)
        }))
        .buffered(concurrency.max(1));

        let mut items = Vec::new();
        let mut vectors: Vec<EmbeddingVector> = Vec::new();
        let mut dimension = None;

        while let Some((item, result)) = embedded.next().await {
            let vector = match result {
                Ok(vector) => vector,
                Err(err) if err.is_degenerate() => {
                    stats.degenerate += 1;
                    tracing::warn!(id = %item.id, "degenerate item vector, excluded from index");
                    continue;
                }
                Err(source) => {
                    return Err(IndexError::Embedding {
                        id: item.id,
                        source,
                    })
                }
            };

            let expected = *dimension.get_or_insert(vector.dim());
            if vector.dim() != expected {
                return Err(IndexError::DimensionMismatch {
                    id: item.id,
                    expected,
                    found: vector.dim(),
                });
            }

            tracing::debug!(id = %item.id, position = items.len(), "item embedded");
            items.push(item);
            vectors.push(vector);
        }

        stats.indexed = items.len();
        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            records = stats.records,
            indexed = stats.indexed,
            missing_id = stats.missing_id,
            duplicate_id = stats.duplicate_id,
            degenerate = stats.degenerate,
            dimension = dimension.unwrap_or(0),
            elapsed_ms = stats.elapsed_ms,
            "catalog index built"
        );

        Ok(Self {
            items,
            vectors,
            dimension,
            normalized: embedder.normalize(),
            built_at: Utc::now(),
            stats,
        })
    }

    /// Assemble an index from vectors computed elsewhere.
    ///
    /// `normalized` is true only when every vector says so.
    pub fn from_parts(
        items: Vec<Item>,
        vectors: Vec<EmbeddingVector>,
    ) -> Result<Self, IndexError> {
        if items.len() != vectors.len() {
            return Err(IndexError::LengthMismatch {
                items: items.len(),
                vectors: vectors.len(),
            });
        }

        let dimension = vectors.first().map(EmbeddingVector::dim);
        if let Some(expected) = dimension {
            if let Some((item, vector)) = items
                .iter()
                .zip(&vectors)
                .find(|(_, v)| v.dim() != expected)
            {
                return Err(IndexError::DimensionMismatch {
                    id: item.id.clone(),
                    expected,
                    found: vector.dim(),
                });
            }
        }

        let normalized = vectors.iter().all(|v| v.normalized);
        let stats = BuildStats {
            records: items.len(),
            indexed: items.len(),
            ..BuildStats::default()
        };
        Ok(Self {
            items,
            vectors,
            dimension,
            normalized,
            built_at: Utc::now(),
            stats,
        })
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Result<&Item, IndexError> {
        self.items.get(index).ok_or(IndexError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    pub fn vector_at(&self, index: usize) -> Result<&EmbeddingVector, IndexError> {
        self.vectors.get(index).ok_or(IndexError::IndexOutOfRange {
            index,
            len: self.vectors.len(),
        })
    }

    /// `(item, vector)` pairs in catalog order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Item, &EmbeddingVector)> + '_ {
        self.items.iter().zip(self.vectors.iter())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn vectors(&self) -> &[EmbeddingVector] {
        &self.vectors
    }

    /// Vector width shared by every entry; `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Whether every stored vector has unit norm.
    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Catalog position of the item with `id`.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use semantic::{EmbeddingProvider, SemanticError, StubProvider, TokenOutputs};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn record(id: &str, name: &str) -> CatalogRecord {
        CatalogRecord::from(Item::new(id, name))
    }

    fn stub_embedder(dim: usize) -> Embedder {
        Embedder::new(Arc::new(StubProvider::new(dim)), true)
    }

    /// Fails for any text containing "boom".
    struct FailingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("boom") {
                return Err(SemanticError::provider("failing", "model exploded"));
            }
            TokenOutputs::from_tokens(vec![vec![1.0, 0.0]], 2)
        }
    }

    /// Width 3 for texts containing "wide", width 2 otherwise.
    struct WidthProvider;

    #[async_trait]
    impl EmbeddingProvider for WidthProvider {
        fn name(&self) -> &str {
            "width"
        }

        async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
            let dim = if text.contains("wide") { 3 } else { 2 };
            TokenOutputs::from_tokens(vec![vec![1.0; dim]], dim)
        }
    }

    /// Sleeps longer for earlier items so completions arrive out of order.
    struct SlowFirstProvider;

    #[async_trait]
    impl EmbeddingProvider for SlowFirstProvider {
        fn name(&self) -> &str {
            "slow-first"
        }

        async fn embed_raw(&self, text: &str) -> Result<TokenOutputs, SemanticError> {
            let n: u64 = text.trim_start_matches("item ").parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(n * 10))).await;
            TokenOutputs::from_tokens(vec![vec![n as f32 + 1.0, 1.0]], 2)
        }
    }

    #[tokio::test]
    async fn build_aligns_items_and_vectors() {
        let records = vec![
            record("a", "red running shoes"),
            record("b", "blue office chair"),
        ];
        let index = CatalogIndex::build(records, &stub_embedder(32), 4)
            .await
            .unwrap();

        assert_eq!(index.size(), 2);
        assert_eq!(index.dimension(), Some(32));
        assert!(index.normalized());
        assert_eq!(index.item_at(0).unwrap().id, "a");
        assert_eq!(index.item_at(1).unwrap().id, "b");
        for (_, vector) in index.iter() {
            assert!((vector.norm() - 1.0).abs() < 1e-6);
        }
        assert_eq!(index.stats().indexed, 2);
    }

    #[tokio::test]
    async fn accessors_reject_out_of_range() {
        let index = CatalogIndex::build(vec![record("a", "lamp")], &stub_embedder(8), 1)
            .await
            .unwrap();
        assert!(matches!(
            index.item_at(1),
            Err(IndexError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            index.vector_at(7),
            Err(IndexError::IndexOutOfRange { index: 7, len: 1 })
        ));
    }

    #[tokio::test]
    async fn missing_ids_are_skipped_before_embedding() {
        let provider = Arc::new(FailingProvider {
            calls: AtomicUsize::new(0),
        });
        let embedder = Embedder::new(provider.clone(), true);
        let records = vec![
            CatalogRecord {
                name: Some("orphan".into()),
                ..Default::default()
            },
            record("a", "lamp"),
        ];
        let index = CatalogIndex::build(records, &embedder, 2).await.unwrap();
        assert_eq!(index.size(), 1);
        assert_eq!(index.stats().missing_id, 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_ids_keep_first() {
        let records = vec![
            record("a", "first"),
            record("b", "other"),
            record("a", "second"),
        ];
        let index = CatalogIndex::build(records, &stub_embedder(8), 2)
            .await
            .unwrap();
        assert_eq!(index.size(), 2);
        assert_eq!(index.item_at(0).unwrap().name, "first");
        assert_eq!(index.stats().duplicate_id, 1);
    }

    #[tokio::test]
    async fn degenerate_items_are_excluded() {
        let records = vec![record("a", "lamp"), record("empty", ""), record("b", "desk")];
        let index = CatalogIndex::build(records, &stub_embedder(8), 3)
            .await
            .unwrap();
        assert_eq!(index.size(), 2);
        assert_eq!(index.position_of("b"), Some(1));
        assert_eq!(index.position_of("empty"), None);
        assert_eq!(index.stats().degenerate, 1);
    }

    #[tokio::test]
    async fn provider_failure_aborts_build() {
        let embedder = Embedder::new(
            Arc::new(FailingProvider {
                calls: AtomicUsize::new(0),
            }),
            true,
        );
        let records = vec![record("a", "fine"), record("b", "boom"), record("c", "fine")];
        let err = CatalogIndex::build(records, &embedder, 1).await.unwrap_err();
        assert!(err.is_provider_failure());
        assert!(matches!(err, IndexError::Embedding { ref id, .. } if id == "b"));
    }

    #[tokio::test]
    async fn dimension_mismatch_aborts_build() {
        let embedder = Embedder::new(Arc::new(WidthProvider), true);
        let records = vec![record("a", "narrow"), record("b", "wide")];
        let err = CatalogIndex::build(records, &embedder, 2).await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn concurrent_build_preserves_catalog_order() {
        let embedder = Embedder::new(Arc::new(SlowFirstProvider), false);
        let records: Vec<_> = (0..4)
            .map(|i| record(&format!("id-{i}"), &format!("item {i}")))
            .collect();
        let index = CatalogIndex::build(records, &embedder, 4).await.unwrap();
        let ids: Vec<&str> = index.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["id-0", "id-1", "id-2", "id-3"]);
        assert_eq!(index.vector_at(2).unwrap().values[0], 3.0);
        assert!(!index.normalized());
    }

    #[tokio::test]
    async fn empty_catalog_builds_empty_index() {
        let index = CatalogIndex::build(Vec::new(), &stub_embedder(8), 4)
            .await
            .unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), None);
    }

    #[test]
    fn from_parts_validates_shape() {
        let items = vec![Item::new("a", "x"), Item::new("b", "y")];
        let err = CatalogIndex::from_parts(
            items.clone(),
            vec![EmbeddingVector::new(vec![1.0, 0.0], true)],
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::LengthMismatch { items: 2, vectors: 1 }));

        let err = CatalogIndex::from_parts(
            items.clone(),
            vec![
                EmbeddingVector::new(vec![1.0, 0.0], true),
                EmbeddingVector::new(vec![1.0], true),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { ref id, .. } if id == "b"));

        let index = CatalogIndex::from_parts(
            items,
            vec![
                EmbeddingVector::new(vec![1.0, 0.0], true),
                EmbeddingVector::new(vec![3.0, 4.0], false),
            ],
        )
        .unwrap();
        assert!(!index.normalized());
        assert_eq!(index.dimension(), Some(2));
    }
}
