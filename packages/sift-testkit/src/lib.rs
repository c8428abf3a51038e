//! Test doubles for the pipeline seams: canned search backends and
//! scripted completion providers, plus a config builder so integration
//! tests never touch the network.

use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::{Map, Value};

use sift_domain::{BackendQuery, HitKind, NormalizedHit, QueryPlan, RawHit};
use sift_pipeline::CompletionProvider;
use sift_retrieval::{BoxFuture, SearchBackend};

/// Backend that always answers with the same normalized hits.
pub struct StaticBackend {
	pub id: String,
	pub kind: HitKind,
	pub hits: Vec<NormalizedHit>,
}

impl StaticBackend {
	pub fn new(id: &str, kind: HitKind, hits: Vec<NormalizedHit>) -> Arc<Self> {
		Arc::new(Self { id: id.to_string(), kind, hits })
	}
}

impl SearchBackend for StaticBackend {
	fn id(&self) -> &str {
		&self.id
	}

	fn kind(&self) -> HitKind {
		self.kind
	}

	fn query(&self, plan: &QueryPlan) -> BackendQuery {
		BackendQuery {
			backend_id: self.id.clone(),
			query_text: plan.entity_keywords.clone(),
			fields: vec!["*".to_string()],
			limit: 10,
		}
	}

	fn search<'a>(
		&'a self,
		_query: &'a BackendQuery,
	) -> BoxFuture<'a, sift_retrieval::Result<Vec<RawHit>>> {
		let raw = self
			.hits
			.iter()
			.map(|hit| RawHit {
				backend_id: self.id.clone(),
				source_id: hit.source_id.clone(),
				score: hit.rank_score,
				fields: Map::new(),
				snippet: hit.snippet.clone(),
			})
			.collect();

		Box::pin(async move { Ok(raw) })
	}

	fn normalize(&self, _hits: Vec<RawHit>) -> Vec<NormalizedHit> {
		self.hits.clone()
	}
}

/// Backend that always fails with the given error constructor.
pub struct FailingBackend {
	pub id: String,
	pub kind: HitKind,
}

impl FailingBackend {
	pub fn new(id: &str, kind: HitKind) -> Arc<Self> {
		Arc::new(Self { id: id.to_string(), kind })
	}
}

impl SearchBackend for FailingBackend {
	fn id(&self) -> &str {
		&self.id
	}

	fn kind(&self) -> HitKind {
		self.kind
	}

	fn query(&self, plan: &QueryPlan) -> BackendQuery {
		BackendQuery {
			backend_id: self.id.clone(),
			query_text: plan.entity_keywords.clone(),
			fields: vec!["*".to_string()],
			limit: 10,
		}
	}

	fn search<'a>(
		&'a self,
		_query: &'a BackendQuery,
	) -> BoxFuture<'a, sift_retrieval::Result<Vec<RawHit>>> {
		Box::pin(async move { Err(sift_retrieval::Error::unavailable("Stubbed outage.")) })
	}

	fn normalize(&self, _hits: Vec<RawHit>) -> Vec<NormalizedHit> {
		Vec::new()
	}
}

/// Backend that hangs for `delay` before answering, for deadline tests.
pub struct SlowBackend {
	pub id: String,
	pub kind: HitKind,
	pub delay: Duration,
}

impl SlowBackend {
	pub fn new(id: &str, kind: HitKind, delay: Duration) -> Arc<Self> {
		Arc::new(Self { id: id.to_string(), kind, delay })
	}
}

impl SearchBackend for SlowBackend {
	fn id(&self) -> &str {
		&self.id
	}

	fn kind(&self) -> HitKind {
		self.kind
	}

	fn query(&self, plan: &QueryPlan) -> BackendQuery {
		BackendQuery {
			backend_id: self.id.clone(),
			query_text: plan.entity_keywords.clone(),
			fields: vec!["*".to_string()],
			limit: 10,
		}
	}

	fn search<'a>(
		&'a self,
		_query: &'a BackendQuery,
	) -> BoxFuture<'a, sift_retrieval::Result<Vec<RawHit>>> {
		Box::pin(async move {
			tokio::time::sleep(self.delay).await;

			Ok(Vec::new())
		})
	}

	fn normalize(&self, _hits: Vec<RawHit>) -> Vec<NormalizedHit> {
		Vec::new()
	}
}

/// Completion provider that always returns the same text and counts calls.
pub struct StaticCompletion {
	pub text: String,
	pub calls: Arc<AtomicUsize>,
}

impl StaticCompletion {
	pub fn new(text: &str) -> Arc<Self> {
		Arc::new(Self { text: text.to_string(), calls: Arc::new(AtomicUsize::new(0)) })
	}
}

impl CompletionProvider for StaticCompletion {
	fn complete<'a>(
		&'a self,
		_messages: &'a [Value],
	) -> BoxFuture<'a, sift_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let text = self.text.clone();

		Box::pin(async move { Ok(text) })
	}
}

/// Completion provider that always fails, for degraded-plan and
/// generation-failure tests.
pub struct FailingCompletion;

impl FailingCompletion {
	pub fn new() -> Arc<Self> {
		Arc::new(Self)
	}
}

impl CompletionProvider for FailingCompletion {
	fn complete<'a>(
		&'a self,
		_messages: &'a [Value],
	) -> BoxFuture<'a, sift_providers::Result<String>> {
		Box::pin(async move { Err(sift_providers::Error::Timeout) })
	}
}

/// Canned normalized hit with one metadata pair.
pub fn hit(kind: HitKind, id: &str, title: &str, metadata: &[(&str, &str)]) -> NormalizedHit {
	NormalizedHit {
		kind,
		source_id: id.to_string(),
		display_title: title.to_string(),
		rank_score: 1.0,
		metadata: metadata
			.iter()
			.map(|(label, value)| (label.to_string(), value.to_string()))
			.collect(),
		snippet: None,
	}
}

/// Minimal valid configuration pointing at loopback endpoints. Tests that
/// use stub backends and providers never dial them.
pub fn test_config() -> sift_config::Config {
	sift_config::Config {
		service: sift_config::Service { log_level: "debug".to_string() },
		pipeline: sift_config::Pipeline::default(),
		backends: sift_config::Backends {
			base_url: "http://127.0.0.1:9200".to_string(),
			username: None,
			password: None,
			persons: sift_config::BackendConfig { index: "persons".to_string(), limit: 10 },
			companies: sift_config::BackendConfig { index: "companies".to_string(), limit: 10 },
			notes: sift_config::BackendConfig { index: "notes".to_string(), limit: 15 },
			documents: sift_config::BackendConfig { index: "documents".to_string(), limit: 5 },
		},
		providers: sift_config::Providers {
			planner: llm_provider("planner-model", 0.1),
			generator: llm_provider("generator-model", 0.3),
			embedding: sift_config::EmbeddingProviderConfig {
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "embed-model".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
	}
}

fn llm_provider(model: &str, temperature: f32) -> sift_config::LlmProviderConfig {
	sift_config::LlmProviderConfig {
		api_base: "http://127.0.0.1:0".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: model.to_string(),
		temperature,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}
