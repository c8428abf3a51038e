use std::{collections::BTreeMap, time::Duration};

use tokio::{task::JoinSet, time::timeout};

use sift_domain::{HitKind, NormalizedHit, QueryPlan};

use crate::Pipeline;

/// Result of the retrieval fan-out: normalized hits grouped by entity
/// kind, plus which backends actually answered in time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetrievalOutcome {
	pub hits_by_kind: BTreeMap<HitKind, Vec<NormalizedHit>>,
	pub availability: BTreeMap<String, bool>,
}

impl Pipeline {
	/// Issues every backend query concurrently under an independent
	/// per-backend deadline. A backend that errors or times out simply
	/// contributes zero hits; the join never outlives the slowest allowed
	/// deadline. Dropping the returned future cancels all in-flight calls.
	pub async fn retrieve(&self, plan: &QueryPlan) -> RetrievalOutcome {
		let deadline = Duration::from_millis(self.cfg.pipeline.per_backend_timeout_ms);
		let mut availability: BTreeMap<String, bool> =
			self.backends.iter().map(|backend| (backend.id().to_string(), false)).collect();
		let mut hits_by_kind: BTreeMap<HitKind, Vec<NormalizedHit>> = BTreeMap::new();
		let mut tasks = JoinSet::new();

		for backend in &self.backends {
			let backend = backend.clone();
			let query = backend.query(plan);

			tasks.spawn(async move {
				let outcome = match timeout(deadline, backend.search(&query)).await {
					Ok(Ok(hits)) => Ok(backend.normalize(hits)),
					Ok(Err(err)) => Err(err),
					Err(_) => Err(sift_retrieval::Error::Timeout),
				};

				(backend.id().to_string(), backend.kind(), outcome)
			});
		}

		while let Some(joined) = tasks.join_next().await {
			let Ok((backend_id, kind, outcome)) = joined else {
				tracing::warn!("A retrieval task was aborted before completing.");

				continue;
			};

			match outcome {
				Ok(hits) => {
					availability.insert(backend_id, true);
					hits_by_kind.entry(kind).or_default().extend(hits);
				},
				Err(err) => {
					tracing::warn!(backend = %backend_id, %err, "Backend contributed no hits.");
				},
			}
		}

		RetrievalOutcome { hits_by_kind, availability }
	}
}
