mod client;
mod error;
mod hybrid;
mod keyword;
mod suggest;

pub use client::SearchClient;
pub use error::{Error, Result};
pub use hybrid::HybridBackend;
pub use keyword::{KeywordBackend, KeywordMode};
pub use suggest::{SUGGEST_FIELDS, Suggestion, suggest};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use sift_domain::{BackendQuery, HitKind, NormalizedHit, QueryPlan, RawHit};
use sift_providers::EmbeddingClient;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Uniform capability over one search backend. The coordinator is written
/// against this trait only; field-layout knowledge stays in the adapter.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn id(&self) -> &str;

	fn kind(&self) -> HitKind;

	/// Scopes the plan to this backend: which query text, which fields,
	/// how many hits.
	fn query(&self, plan: &QueryPlan) -> BackendQuery;

	fn search<'a>(&'a self, query: &'a BackendQuery) -> BoxFuture<'a, Result<Vec<RawHit>>>;

	/// Maps backend-native hits into the shared shape. Unknown or missing
	/// fields are omitted, never an error.
	fn normalize(&self, hits: Vec<RawHit>) -> Vec<NormalizedHit>;
}

/// Builds the standard backend set: strict keyword adapters for persons and
/// companies, a loose keyword adapter for notes, and the hybrid document
/// adapter.
pub fn standard_backends(
	cfg: &sift_config::Config,
	embedding: Arc<EmbeddingClient>,
) -> Result<Vec<Arc<dyn SearchBackend>>> {
	let timeout = Duration::from_millis(cfg.pipeline.per_backend_timeout_ms);
	let client = Arc::new(SearchClient::new(&cfg.backends, timeout)?);

	Ok(vec![
		Arc::new(KeywordBackend::new(
			client.clone(),
			HitKind::Person,
			KeywordMode::Strict,
			&cfg.backends.persons,
		)),
		Arc::new(KeywordBackend::new(
			client.clone(),
			HitKind::Company,
			KeywordMode::Strict,
			&cfg.backends.companies,
		)),
		Arc::new(KeywordBackend::new(
			client.clone(),
			HitKind::Note,
			KeywordMode::Loose,
			&cfg.backends.notes,
		)),
		Arc::new(HybridBackend::new(client, embedding, &cfg.backends.documents)),
	])
}

/// Normalizes scores within one backend response: the top hit maps to 1.0,
/// the rest scale linearly. Never comparable across backends.
pub(crate) fn local_rank_scores(hits: &[RawHit]) -> Vec<f32> {
	let max = hits.iter().map(|hit| hit.score).fold(0.0_f32, f32::max);

	hits.iter()
		.map(|hit| if max > 0.0 { (hit.score / max).clamp(0.0, 1.0) } else { 0.0 })
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(score: f32) -> RawHit {
		RawHit {
			backend_id: "persons".to_string(),
			source_id: "x".to_string(),
			score,
			fields: serde_json::Map::new(),
			snippet: None,
		}
	}

	#[test]
	fn top_hit_normalizes_to_one() {
		let scores = local_rank_scores(&[raw(8.0), raw(4.0), raw(2.0)]);

		assert_eq!(scores, vec![1.0, 0.5, 0.25]);
	}

	#[test]
	fn zero_scores_stay_zero() {
		let scores = local_rank_scores(&[raw(0.0), raw(0.0)]);

		assert_eq!(scores, vec![0.0, 0.0]);
	}
}
