use std::{sync::Arc, time::Duration};

use axum::{Json, Router, extract::Path, routing::post};
use serde_json::Value;

use sift_config::BackendConfig;
use sift_domain::{HitKind, QueryPlan};
use sift_providers::EmbeddingClient;
use sift_retrieval::{
	Error, HybridBackend, KeywordBackend, KeywordMode, SUGGEST_FIELDS, SearchBackend,
	SearchClient, suggest,
};

/// In-process stand-in for the search service: canned `_search` responses
/// per index, plus a slow route for deadline tests.
async fn spawn_fixture() -> String {
	let app = Router::new().route("/{index}/_search", post(search_handler));
	let listener =
		tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
	let addr = listener.local_addr().expect("local_addr failed");

	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("fixture server failed");
	});

	format!("http://{addr}")
}

async fn search_handler(Path(index): Path<String>, Json(body): Json<Value>) -> Json<Value> {
	match index.as_str() {
		"persons" => Json(serde_json::json!({
			"hits": { "hits": [
				{
					"_id": "es-1",
					"_score": 4.2,
					"_source": {
						"id": "p1",
						"name": "Jane Doe",
						"metadata": {
							"designation": "Full Stack Engineer",
							"company": "Tencent",
							"location": "Shenzhen"
						}
					}
				},
				{
					"_id": "es-2",
					"_score": 2.1,
					"_source": { "id": "p2", "name": "John Roe" }
				}
			] }
		})),
		"documents" => {
			// Reflect whether the request carried a kNN clause so tests can
			// observe the keyword-only degrade.
			let title = if body.get("knn").is_some() { "hybrid" } else { "keyword-only" };

			Json(serde_json::json!({
				"hits": { "hits": [
					{
						"_id": "es-3",
						"_score": 1.5,
						"_source": { "card_id": "d1", "title": title, "content": "Tencent roles." }
					}
				] }
			}))
		},
		"slow" => {
			tokio::time::sleep(Duration::from_secs(5)).await;

			Json(serde_json::json!({ "hits": { "hits": [] } }))
		},
		"broken" => Json(serde_json::json!({ "took": 1 })),
		_ => Json(serde_json::json!({ "hits": { "hits": [] } })),
	}
}

fn backends_cfg(base_url: &str) -> sift_config::Backends {
	sift_config::Backends {
		base_url: base_url.to_string(),
		username: None,
		password: None,
		persons: BackendConfig { index: "persons".to_string(), limit: 10 },
		companies: BackendConfig { index: "companies".to_string(), limit: 10 },
		notes: BackendConfig { index: "notes".to_string(), limit: 15 },
		documents: BackendConfig { index: "documents".to_string(), limit: 5 },
	}
}

fn dead_embedding_client() -> Arc<EmbeddingClient> {
	let cfg = sift_config::EmbeddingProviderConfig {
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/embeddings".to_string(),
		model: "embed-model".to_string(),
		dimensions: 4,
		timeout_ms: 300,
		default_headers: serde_json::Map::new(),
	};

	Arc::new(EmbeddingClient::new(&cfg).expect("embedding client build failed"))
}

#[tokio::test]
async fn keyword_backend_normalizes_person_hits() {
	let base_url = spawn_fixture().await;
	let cfg = backends_cfg(&base_url);
	let client =
		Arc::new(SearchClient::new(&cfg, Duration::from_secs(2)).expect("client build failed"));
	let backend = KeywordBackend::new(client, HitKind::Person, KeywordMode::Strict, &cfg.persons);
	let plan = QueryPlan::new("Who is the guy at Tencent?", "Tencent", "Tencent employee");
	let query = backend.query(&plan);
	let hits = backend.search(&query).await.expect("search failed");
	let normalized = backend.normalize(hits);

	assert_eq!(normalized.len(), 2);
	assert_eq!(normalized[0].display_title, "Jane Doe");
	assert_eq!(normalized[0].rank_score, 1.0);
	assert!(
		normalized[0]
			.metadata
			.contains(&("Company".to_string(), "Tencent".to_string()))
	);
	assert_eq!(normalized[1].display_title, "John Roe");
	assert!(normalized[1].rank_score < 1.0);
}

#[tokio::test]
async fn hybrid_backend_degrades_to_keyword_only_without_embeddings() {
	let base_url = spawn_fixture().await;
	let cfg = backends_cfg(&base_url);
	let client =
		Arc::new(SearchClient::new(&cfg, Duration::from_secs(2)).expect("client build failed"));
	let backend = HybridBackend::new(client, dead_embedding_client(), &cfg.documents);
	let plan = QueryPlan::new("q", "Tencent", "Tencent employee");
	let query = backend.query(&plan);
	let hits = backend.search(&query).await.expect("search failed");
	let normalized = backend.normalize(hits);

	assert_eq!(normalized.len(), 1);
	assert_eq!(normalized[0].display_title, "keyword-only");
	assert_eq!(normalized[0].snippet.as_deref(), Some("Tencent roles."));
}

#[tokio::test]
async fn slow_backend_times_out() {
	let base_url = spawn_fixture().await;
	let cfg = backends_cfg(&base_url);
	let client = Arc::new(
		SearchClient::new(&cfg, Duration::from_millis(100)).expect("client build failed"),
	);
	let backend_cfg = BackendConfig { index: "slow".to_string(), limit: 10 };
	let backend = KeywordBackend::new(client, HitKind::Person, KeywordMode::Strict, &backend_cfg);
	let plan = QueryPlan::degraded("anything");
	let query = backend.query(&plan);

	assert!(matches!(backend.search(&query).await, Err(Error::Timeout)));
}

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
	let cfg = backends_cfg("http://127.0.0.1:1");
	let client = Arc::new(
		SearchClient::new(&cfg, Duration::from_millis(300)).expect("client build failed"),
	);
	let backend = KeywordBackend::new(client, HitKind::Company, KeywordMode::Strict, &cfg.companies);
	let plan = QueryPlan::degraded("anything");
	let query = backend.query(&plan);

	assert!(matches!(backend.search(&query).await, Err(Error::Unavailable { .. })));
}

#[tokio::test]
async fn response_without_hits_array_is_malformed() {
	let base_url = spawn_fixture().await;
	let cfg = backends_cfg(&base_url);
	let client =
		Arc::new(SearchClient::new(&cfg, Duration::from_secs(2)).expect("client build failed"));
	let backend_cfg = BackendConfig { index: "broken".to_string(), limit: 10 };
	let backend = KeywordBackend::new(client, HitKind::Note, KeywordMode::Loose, &backend_cfg);
	let plan = QueryPlan::degraded("anything");
	let query = backend.query(&plan);

	assert!(matches!(backend.search(&query).await, Err(Error::MalformedResponse { .. })));
}

#[tokio::test]
async fn suggest_returns_labels_with_hints() {
	let base_url = spawn_fixture().await;
	let cfg = backends_cfg(&base_url);
	let client =
		Arc::new(SearchClient::new(&cfg, Duration::from_secs(2)).expect("client build failed"));
	let fields: Vec<String> = SUGGEST_FIELDS.iter().map(|field| field.to_string()).collect();
	let suggestions = suggest(&client, "persons", HitKind::Person, "Jan", &fields, 5)
		.await
		.expect("suggest failed");

	assert_eq!(suggestions.len(), 2);
	assert_eq!(suggestions[0].label, "Jane Doe");
	assert_eq!(suggestions[0].context_hint.as_deref(), Some("Full Stack Engineer"));
	assert_eq!(suggestions[0].source_kind, HitKind::Person);
	assert!(suggestions[1].context_hint.is_none());
}

#[tokio::test]
async fn empty_prefix_returns_no_suggestions() {
	let base_url = spawn_fixture().await;
	let cfg = backends_cfg(&base_url);
	let client =
		Arc::new(SearchClient::new(&cfg, Duration::from_secs(2)).expect("client build failed"));
	let suggestions =
		suggest(&client, "persons", HitKind::Person, "  ", &[], 5).await.expect("suggest failed");

	assert!(suggestions.is_empty());
}
