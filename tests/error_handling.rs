mod common;

use std::sync::Arc;

use common::{LexiconProvider, record, shoes_and_chair};
use semsearch::{
    CatalogIndex, Embedder, EmbeddingVector, FailureCode, IndexError, Item, MatchError,
    SearchConfig, SearchEngine, SemanticError, TokenOutputs, l2_normalize, mean_pool,
    parse_catalog, rank,
};

async fn engine(provider: Arc<LexiconProvider>) -> SearchEngine {
    SearchEngine::build(
        shoes_and_chair(),
        Embedder::new(provider, true),
        SearchConfig::default(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn blank_queries_never_reach_the_provider() {
    let provider = LexiconProvider::new();
    let engine = engine(provider.clone()).await;
    let baseline = provider.calls();

    for query in ["", "   ", "\n\t "] {
        let response = engine.search(query).await;
        assert!(response.results.is_empty());
        assert!(response.error.is_none());
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"results":[]}"#
        );
    }
    assert_eq!(provider.calls(), baseline);
}

#[tokio::test]
async fn provider_outage_is_search_unavailable() {
    let provider = LexiconProvider::new();
    let engine = engine(provider.clone()).await;
    provider.set_down(true);

    let response = engine.search("office chair").await;
    assert!(response.results.is_empty());
    let failure = response.error.unwrap();
    assert_eq!(failure.code, FailureCode::ProviderUnavailable);
    assert!(failure.message.contains("inference backend offline"));

    let json = serde_json::to_value(engine.search("office chair").await).unwrap();
    assert_eq!(json["error"]["code"], "provider_unavailable");
}

#[tokio::test]
async fn degenerate_query_yields_empty_results() {
    let engine = engine(LexiconProvider::new()).await;
    let response = engine.search("xylophone quartz").await;
    assert!(response.results.is_empty());
    assert_eq!(response.error.unwrap().code, FailureCode::DegenerateQuery);
}

#[tokio::test]
async fn provider_failure_aborts_the_whole_build() {
    let provider = LexiconProvider::new();
    provider.set_down(true);
    let err = SearchEngine::build(
        shoes_and_chair(),
        Embedder::new(provider, true),
        SearchConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        &err,
        MatchError::Index(IndexError::Embedding { id, .. }) if id == "a"
    ));
    assert_eq!(err.failure_code(), FailureCode::ProviderUnavailable);
}

#[tokio::test]
async fn failed_rebuild_keeps_serving_the_old_snapshot() {
    let provider = LexiconProvider::new();
    let engine = engine(provider.clone()).await;
    let before = engine.catalog();

    provider.set_down(true);
    assert!(engine.rebuild(vec![record("c", "lamp")]).await.is_err());
    provider.set_down(false);

    assert!(Arc::ptr_eq(&before, &engine.catalog()));
    assert_eq!(engine.search("sneakers").await.results[0].item.id, "a");
}

#[tokio::test]
async fn unusable_records_are_excluded_and_counted() {
    let records = parse_catalog(
        r#"[
            {"id": "ok-1", "name": "running shoes"},
            {"name": "no id at all"},
            {"id": "   ", "name": "blank id"},
            {"id": "ok-1", "name": "duplicate of the first"},
            {"id": "mystery", "name": "xylophone"}
        ]"#,
    )
    .unwrap();

    let engine = SearchEngine::build(
        records,
        Embedder::new(LexiconProvider::new(), true),
        SearchConfig::default(),
    )
    .await
    .unwrap();

    let snapshot = engine.catalog();
    let stats = snapshot.stats();
    assert_eq!(stats.records, 5);
    assert_eq!(stats.missing_id, 2);
    assert_eq!(stats.duplicate_id, 1);
    assert_eq!(stats.degenerate, 1);
    assert_eq!(stats.indexed, 1);
    assert_eq!(snapshot.size(), 1);
    assert_eq!(snapshot.item_at(0).unwrap().name, "running shoes");
}

#[test]
fn out_of_range_access_is_an_error() {
    let index = CatalogIndex::from_parts(
        vec![Item::new("a", "x")],
        vec![EmbeddingVector::new(vec![1.0, 0.0], true)],
    )
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

#[test]
fn mismatched_query_width_is_rejected() {
    let index = CatalogIndex::from_parts(
        vec![Item::new("a", "x"), Item::new("b", "y")],
        vec![
            EmbeddingVector::new(vec![1.0, 0.0, 0.0], true),
            EmbeddingVector::new(vec![0.0, 1.0, 0.0], true),
        ],
    )
    .unwrap();
    let query = EmbeddingVector::new(l2_normalize(vec![1.0, 1.0]).unwrap(), true);

    let err = rank(&query, &index, 2).unwrap_err();
    assert!(matches!(
        err,
        MatchError::DimensionMismatch {
            expected: 3,
            found: 2
        }
    ));
    assert_eq!(err.failure_code(), FailureCode::InternalError);
}

#[test]
fn mixed_width_catalog_is_rejected() {
    let err = CatalogIndex::from_parts(
        vec![Item::new("a", "x"), Item::new("b", "y")],
        vec![
            EmbeddingVector::new(vec![1.0, 0.0], true),
            EmbeddingVector::new(vec![1.0, 0.0, 0.0], true),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, IndexError::DimensionMismatch { .. }));
}

#[test]
fn malformed_provider_output_is_rejected() {
    assert!(matches!(
        TokenOutputs::new(vec![2, 3], vec![1.0; 5]),
        Err(SemanticError::InvalidOutput(_))
    ));

    let empty = TokenOutputs::new(vec![0, 4], Vec::new()).unwrap();
    assert!(mean_pool(&empty).unwrap_err().is_degenerate());

    assert!(l2_normalize(vec![0.0, 0.0, 0.0]).unwrap_err().is_degenerate());
}

#[test]
fn malformed_catalog_json_is_an_error() {
    assert!(matches!(
        parse_catalog("{\"id\": \"not-an-array\"}"),
        Err(IndexError::Json(_))
    ));
}
