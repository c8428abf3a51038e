/// Decomposed search plan for one user turn. Immutable once built; both
/// query fields are guaranteed non-empty.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryPlan {
	pub entity_keywords: String,
	pub document_query: String,
	pub raw_question: String,
	pub degraded: bool,
}

impl QueryPlan {
	/// Builds a plan from planner output. A blank field falls back to the
	/// raw question so downstream queries are never empty.
	pub fn new(raw_question: &str, entity_keywords: &str, document_query: &str) -> Self {
		Self {
			entity_keywords: non_blank_or(entity_keywords, raw_question),
			document_query: non_blank_or(document_query, raw_question),
			raw_question: raw_question.to_string(),
			degraded: false,
		}
	}

	/// Fallback plan used when the planner call failed or returned a shape
	/// that could not be parsed. Both fields carry the raw question verbatim.
	pub fn degraded(raw_question: &str) -> Self {
		Self {
			entity_keywords: raw_question.to_string(),
			document_query: raw_question.to_string(),
			raw_question: raw_question.to_string(),
			degraded: true,
		}
	}
}

fn non_blank_or(value: &str, fallback: &str) -> String {
	let trimmed = value.trim();

	if trimmed.is_empty() { fallback.to_string() } else { trimmed.to_string() }
}
