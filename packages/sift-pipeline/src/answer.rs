use std::collections::{BTreeMap, BTreeSet};

use sift_domain::ConversationTurn;

use crate::{Pipeline, Result, synthesize};

/// Response at the pipeline boundary, consumed by the API layer that owns
/// the conversation history.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnswerResponse {
	pub trace_id: uuid::Uuid,
	pub text: String,
	pub cited_sources: BTreeSet<String>,
	pub backend_availability: BTreeMap<String, bool>,
	pub degraded_plan: bool,
}

impl Pipeline {
	/// Runs one question end to end: plan, concurrent retrieval, context
	/// synthesis, cited generation. Planner and backend failures degrade
	/// silently into the response metadata; only a generation failure is
	/// returned as an error. The history is borrowed and never mutated.
	pub async fn answer(
		&self,
		question: &str,
		history: &[ConversationTurn],
	) -> Result<AnswerResponse> {
		let trace_id = uuid::Uuid::new_v4();
		let plan = self.plan(question, history).await;

		tracing::debug!(
			%trace_id,
			entity_keywords = %plan.entity_keywords,
			document_query = %plan.document_query,
			degraded = plan.degraded,
			"Query plan ready."
		);

		let outcome = self.retrieve(&plan).await;
		let window = synthesize(
			&outcome.hits_by_kind,
			self.cfg.pipeline.top_k_per_group,
			self.cfg.pipeline.context_budget_chars,
		);

		if window.is_empty() {
			tracing::debug!(%trace_id, "Context is empty; the answer will report no findings.");
		}

		let answer = self.generate(question, &window, history).await?;

		tracing::debug!(
			%trace_id,
			entries = window.entry_count(),
			cited = answer.cited_sources.len(),
			"Answer generated."
		);

		Ok(AnswerResponse {
			trace_id,
			text: answer.text,
			cited_sources: answer.cited_sources,
			backend_availability: outcome.availability,
			degraded_plan: plan.degraded,
		})
	}
}
