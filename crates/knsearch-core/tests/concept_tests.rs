mod common;

use common::*;
use serde_json::json;

use knsearch_core::ontology::{ActionType, LogicProperty, OntologyError};
use knsearch_core::retrieval::ConceptRetriever;
use knsearch_core::RetrievalConfig;

fn config(top_k: usize) -> RetrievalConfig {
    RetrievalConfig {
        top_k,
        ..Default::default()
    }
}

fn ids<T, F: Fn(&T) -> &str>(items: &[T], id: F) -> Vec<&str> {
    items.iter().map(id).collect()
}

#[tokio::test]
async fn test_no_relations_returns_double_top_k_by_score() {
    let objects = (0..20)
        .map(|i| object_type(&format!("ot_{i}"), &format!("Type {i}"), (i + 1) as f64 / 100.0))
        .collect();
    let manager = FakeManager::new(network(objects, Vec::new()));
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "anything", false, &config(5))
        .await
        .unwrap();

    assert_eq!(result.object_types.len(), 10);
    let scores: Vec<f64> = result.object_types.iter().map(|o| o.score).collect();
    assert!(scores.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(result.object_types[0].concept_id, "ot_19");
    assert_eq!(reranker.call_count(), 0);
}

#[tokio::test]
async fn test_relation_endpoints_then_backfill() {
    let mut objects = vec![
        object_type("customer", "Customer", 0.0),
        object_type("order", "Order", 0.0),
        object_type("supplier", "Supplier", 0.0),
        object_type("product", "Product", 0.0),
    ];
    for i in 0..10 {
        objects.push(object_type(&format!("extra_{i}"), "Extra", (i + 1) as f64));
    }
    let relations = vec![
        relation("places", "places", "customer", "order"),
        relation("supplies", "supplies", "supplier", "product"),
    ];
    let manager = FakeManager::new(network(objects, relations));
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "orders", false, &config(10))
        .await
        .unwrap();

    assert_eq!(result.object_types.len(), 10);
    let selected = ids(&result.object_types, |o| o.concept_id.as_str());
    assert_eq!(&selected[..4], &["customer", "order", "supplier", "product"]);
    // backfill is best score first
    assert_eq!(selected[4], "extra_9");
    assert_eq!(selected[9], "extra_4");
}

#[tokio::test]
async fn test_coarse_recall_narrows_large_networks() {
    let objects: Vec<_> = (0..100)
        .map(|i| object_type(&format!("o{i}"), &format!("Object {i}"), 0.0))
        .collect();
    let relations: Vec<_> = (0..6000)
        .map(|i| {
            relation(
                &format!("rel_{i}"),
                &format!("link {i}"),
                &format!("o{}", i % 100),
                &format!("o{}", (i + 1) % 100),
            )
        })
        .collect();

    let mut manager = FakeManager::new(network(objects, relations));
    manager.object_hits = Some(vec![hit("o10", 0.9), hit("o20", 0.8)]);
    manager.relation_hits = Some(vec![hit("rel_0", 0.7), hit("rel_1", 0.6)]);
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "link", false, &config(10))
        .await
        .unwrap();

    assert_eq!(manager.search_calls(), 2);
    assert_eq!(
        ids(&result.relation_types, |r| r.concept_id.as_str()),
        vec!["rel_0", "rel_1"]
    );
    assert_eq!(
        ids(&result.object_types, |o| o.concept_id.as_str()),
        vec!["o0", "o1", "o2", "o10", "o20"]
    );
    assert_eq!(result.object_types[3].score, 0.9);
}

#[tokio::test]
async fn test_coarse_recall_failure_keeps_full_schema() {
    let objects = vec![object_type("a", "A", 0.0), object_type("b", "B", 0.0)];
    let relations = vec![relation("r1", "r1", "a", "b"), relation("r2", "r2", "b", "a")];
    let manager = FakeManager::new(network(objects, relations));
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let config = RetrievalConfig {
        coarse_min_relation_count: 1,
        ..config(10)
    };
    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "q", false, &config)
        .await
        .unwrap();

    assert_eq!(manager.search_calls(), 2);
    assert_eq!(result.relation_types.len(), 2);
    assert_eq!(result.object_types.len(), 2);
}

#[tokio::test]
async fn test_rerank_orders_relations_and_writes_scores() {
    let objects = vec![
        object_type("c", "Customer", 0.0),
        object_type("o", "Order", 0.0),
    ];
    let relations = vec![
        relation("r1", "reviews", "c", "o"),
        relation("r2", "places", "c", "o"),
        relation("r3", "cancels", "c", "o"),
    ];
    let manager = FakeManager::new(network(objects, relations));
    let query = FakeQuery::default();
    let reranker = FakeReranker::with_scores(vec![0.2, 0.9, 0.5]);

    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "who places orders", true, &config(2))
        .await
        .unwrap();

    assert_eq!(reranker.call_count(), 1);
    assert_eq!(
        reranker.documents.lock().unwrap()[1],
        "Customer places Order".to_string()
    );
    assert_eq!(
        ids(&result.relation_types, |r| r.concept_id.as_str()),
        vec!["r2", "r3"]
    );
    assert_eq!(result.relation_types[0].score, 0.9);
}

#[tokio::test]
async fn test_rerank_failure_falls_back_to_simple_match() {
    let objects = vec![object_type("c", "Customer", 0.0), object_type("o", "Order", 0.0)];
    let relations = vec![
        relation("r1", "reviews", "c", "o"),
        relation("r2", "places", "c", "o"),
        relation("r3", "rates", "c", "o"),
    ];
    let manager = FakeManager::new(network(objects, relations));
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let first = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "places", true, &config(2))
        .await
        .unwrap();
    let second = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "places", true, &config(2))
        .await
        .unwrap();

    assert_eq!(reranker.call_count(), 2);
    assert_eq!(
        ids(&first.relation_types, |r| r.concept_id.as_str()),
        vec!["r2", "r1"]
    );
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_property_quotas_hold() {
    let objects: Vec<_> = (0..8)
        .map(|i| {
            let mut obj = object_type(&format!("ot_{i}"), "T", 1.0);
            obj.data_properties = (0..12)
                .map(|p| property(&format!("field_{p}"), "string", &["=="]))
                .collect();
            obj.logic_properties = (0..10)
                .map(|p| LogicProperty {
                    name: format!("metric_{p}"),
                    property_type: "metric".to_string(),
                    ..Default::default()
                })
                .collect();
            obj
        })
        .collect();
    let manager = FakeManager::new(network(objects, Vec::new()));
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let config = RetrievalConfig {
        per_object_property_top_k: 8,
        global_property_top_k: 50,
        ..config(10)
    };
    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "field", false, &config)
        .await
        .unwrap();

    let mut total = 0;
    for obj in &result.object_types {
        assert!(obj.data_properties.len() <= 8);
        assert!(obj.logic_properties.len() <= 8);
        total += obj.data_properties.len() + obj.logic_properties.len();
    }
    assert_eq!(total, 50);
    // the unconverted selection keeps every property for instance retrieval
    assert_eq!(result.selected[0].data_properties.len(), 12);
}

#[tokio::test]
async fn test_samples_are_attached_and_failures_skipped() {
    let objects = vec![object_type("a", "A", 0.5), object_type("b", "B", 0.4)];
    let manager = FakeManager::new(network(objects, Vec::new()));
    let query = FakeQuery::default()
        .with_instances("a", vec![json!({"name": "alpha", "_score": 1.0}), json!({"name": "beta"})])
        .failing_on("b");
    let reranker = FakeReranker::failing();

    let config = RetrievalConfig {
        include_sample_data: true,
        schema_brief: true,
        ..config(10)
    };
    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "q", false, &config)
        .await
        .unwrap();

    let sample = result.object_types[0].sample_data.as_ref().unwrap();
    assert_eq!(sample["name"], "alpha");
    assert!(!sample.contains_key("_score"));
    assert!(result.object_types[1].sample_data.is_none());
    assert!(query.requests().iter().all(|r| r.limit == 1 && r.condition.is_none()));
}

#[tokio::test]
async fn test_actions_carry_owner_name() {
    let mut detail = network(vec![object_type("pod", "Pod", 0.0)], Vec::new());
    detail.action_types = vec![ActionType {
        id: "restart".to_string(),
        name: "Restart".to_string(),
        object_type_id: "pod".to_string(),
        ..Default::default()
    }];
    let manager = FakeManager::new(detail);
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let result = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_test", "restart pods", false, &config(10))
        .await
        .unwrap();

    assert_eq!(result.action_types.len(), 1);
    assert_eq!(result.action_types[0].object_type_name, "Pod");
    assert_eq!(result.action_types[0].kn_id, "kn_test");
}

#[tokio::test]
async fn test_detail_failure_is_fatal() {
    let manager = FakeManager {
        fail_detail: true,
        ..Default::default()
    };
    let query = FakeQuery::default();
    let reranker = FakeReranker::failing();

    let err = ConceptRetriever::new(&manager, &query, &reranker)
        .retrieve("kn_missing", "q", false, &config(10))
        .await
        .unwrap_err();

    assert!(matches!(err, OntologyError::ApiError { status: 404, .. }));
    assert_eq!(manager.search_calls(), 0);
}
