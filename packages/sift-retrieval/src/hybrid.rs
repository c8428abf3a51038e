use std::{cmp::Ordering, sync::Arc};

use serde_json::Value;

use sift_domain::{BackendQuery, HitKind, NormalizedHit, QueryPlan, RawHit};
use sift_providers::EmbeddingClient;

use crate::{
	BoxFuture, Result, SearchBackend, SearchClient, client,
	keyword::{meta_value, str_field},
	local_rank_scores,
};

/// Document chunks carry up to this much text into the context window.
const SNIPPET_MAX_CHARS: usize = 800;

/// Hybrid adapter over the document-chunk index: dense kNN plus keyword
/// scoring when a query embedding is available, keyword-only otherwise.
pub struct HybridBackend {
	client: Arc<SearchClient>,
	embedding: Arc<EmbeddingClient>,
	index: String,
	limit: usize,
}

impl HybridBackend {
	pub fn new(
		client: Arc<SearchClient>,
		embedding: Arc<EmbeddingClient>,
		cfg: &sift_config::BackendConfig,
	) -> Self {
		Self { client, embedding, index: cfg.index.clone(), limit: cfg.limit }
	}

	fn body(&self, query: &BackendQuery, query_vector: Option<&[f32]>) -> Value {
		let keyword_query = serde_json::json!({
			"multi_match": {
				"query": query.query_text,
				"fields": query.fields,
				"type": "best_fields",
				"fuzziness": "AUTO",
			}
		});
		let mut body = serde_json::json!({
			"query": { "bool": { "should": [keyword_query], "boost": 1.0 } },
			"size": query.limit,
			"highlight": { "fields": { "title": {}, "content": {} } },
		});

		if let Some(vector) = query_vector {
			body["knn"] = serde_json::json!({
				"field": "text_embedding",
				"query_vector": vector,
				"k": query.limit,
				"num_candidates": query.limit * 2,
				"boost": 0.5,
			});
		}

		body
	}
}

impl SearchBackend for HybridBackend {
	fn id(&self) -> &str {
		&self.index
	}

	fn kind(&self) -> HitKind {
		HitKind::Document
	}

	fn query(&self, plan: &QueryPlan) -> BackendQuery {
		BackendQuery {
			backend_id: self.index.clone(),
			query_text: plan.document_query.clone(),
			fields: vec!["title^3".to_string(), "content^2".to_string()],
			limit: self.limit,
		}
	}

	fn search<'a>(&'a self, query: &'a BackendQuery) -> BoxFuture<'a, Result<Vec<RawHit>>> {
		Box::pin(async move {
			// Embedding failure degrades to keyword-only, it never fails
			// the backend call.
			let query_vector = match self.embedding.embed(&[query.query_text.clone()]).await {
				Ok(mut vectors) if !vectors.is_empty() => Some(vectors.remove(0)),
				Ok(_) => None,
				Err(err) => {
					tracing::debug!(backend = %self.index, %err, "Query embedding failed, degrading to keyword-only search.");

					None
				},
			};
			let body = self.body(query, query_vector.as_deref());
			let json = self.client.search(&self.index, &body).await?;
			let hits = client::parse_search_hits(&self.index, &json)?;

			Ok(aggregate_chunks(hits, query.limit))
		})
	}

	fn normalize(&self, hits: Vec<RawHit>) -> Vec<NormalizedHit> {
		let scores = local_rank_scores(&hits);

		hits.into_iter()
			.zip(scores)
			.map(|(hit, rank_score)| {
				let title = str_field(&hit.fields, "title").unwrap_or("Unknown").to_string();
				let content = str_field(&hit.fields, "content")
					.map(|text| truncate_chars(text, SNIPPET_MAX_CHARS));
				let metadata = meta_value(&hit.fields, "filename")
					.map(|filename| vec![("File".to_string(), filename)])
					.unwrap_or_default();

				NormalizedHit {
					kind: HitKind::Document,
					source_id: hit.source_id,
					display_title: title,
					rank_score,
					metadata,
					snippet: content.or(hit.snippet),
				}
			})
			.collect()
	}
}

/// One document can match through several chunks; keep the best-scoring
/// chunk per card and re-rank by score before applying the limit.
fn aggregate_chunks(hits: Vec<RawHit>, limit: usize) -> Vec<RawHit> {
	let mut best: Vec<RawHit> = Vec::new();

	for hit in hits {
		match best.iter_mut().find(|kept| kept.source_id == hit.source_id) {
			Some(kept) => {
				if hit.score > kept.score {
					*kept = hit;
				}
			},
			None => best.push(hit),
		}
	}

	best.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
	best.truncate(limit);

	best
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}
