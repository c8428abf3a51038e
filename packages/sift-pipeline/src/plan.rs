use serde_json::Value;

use sift_domain::{ConversationTurn, QueryPlan, bounded_tail};
use sift_providers::completion::message;

use crate::Pipeline;

/// The planner only ever sees the most recent exchanges; older turns add
/// cost without resolving any pronoun the user is still using.
const PLANNER_HISTORY_TURNS: usize = 4;

const PLANNER_SYSTEM_PROMPT: &str = "You are a search query generator. \
Analyze the user's question and extract clean search terms.\n\
\n\
INSTRUCTIONS:\n\
1. entity_keywords: extract ONLY the core values (names, years, cities, roles). \
Remove generic words like 'company', 'companies', 'firm', 'list', 'show me', \
'where is', 'in', 'founded', 'year', 'located', 'based', 'from'.\n\
   - \"Companies founded in 2020\" -> \"2020\"\n\
   - \"Companies from Boston\" -> \"Boston\"\n\
   - \"Who is the CEO of Apple?\" -> \"Apple CEO\"\n\
2. document_query: a natural-language phrase for semantic search over \
uploaded files, e.g. \"Tencent employee\" for \"Who is the guy at Tencent?\".\n\
\n\
If the question refers to earlier turns, resolve the reference using the \
conversation history below before extracting terms.\n\
\n\
Return ONLY a JSON object:\n\
{\"entity_keywords\": \"...\", \"document_query\": \"...\"}";

impl Pipeline {
	/// Decomposes one user question into a query plan. Never fails: a dead
	/// or incoherent planner yields the raw-question fallback plan with
	/// `degraded` set, which downstream logging picks up.
	pub async fn plan(&self, question: &str, history: &[ConversationTurn]) -> QueryPlan {
		let messages = planner_messages(question, bounded_tail(history, PLANNER_HISTORY_TURNS));

		match self.planner.complete(&messages).await {
			Ok(text) => match parse_plan_response(question, &text) {
				Some(plan) => plan,
				None => {
					tracing::warn!(
						response = %text,
						"Planner returned a malformed plan, falling back to the raw question."
					);

					QueryPlan::degraded(question)
				},
			},
			Err(err) => {
				tracing::warn!(%err, "Planner inference failed, falling back to the raw question.");

				QueryPlan::degraded(question)
			},
		}
	}
}

pub(crate) fn planner_messages(question: &str, history: &[ConversationTurn]) -> Vec<Value> {
	let mut system = PLANNER_SYSTEM_PROMPT.to_string();

	if !history.is_empty() {
		let rendered: Vec<String> = history
			.iter()
			.map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
			.collect();

		system.push_str("\n\nCONVERSATION HISTORY:\n");
		system.push_str(&rendered.join("\n"));
	}

	vec![message("system", &system), message("user", question)]
}

#[derive(Debug, serde::Deserialize)]
struct PlanFields {
	entity_keywords: Option<String>,
	document_query: Option<String>,
}

/// Parses planner output, tolerating the Markdown code fences chat models
/// love to wrap JSON in. `None` means the response is unusable and the
/// caller should degrade.
pub(crate) fn parse_plan_response(question: &str, text: &str) -> Option<QueryPlan> {
	let raw = strip_code_fences(text);
	let fields: PlanFields = serde_json::from_str(raw).ok()?;

	if fields.entity_keywords.is_none() && fields.document_query.is_none() {
		return None;
	}

	Some(QueryPlan::new(
		question,
		fields.entity_keywords.as_deref().unwrap_or(""),
		fields.document_query.as_deref().unwrap_or(""),
	))
}

fn strip_code_fences(text: &str) -> &str {
	for fence in ["```json", "```"] {
		if let Some(start) = text.find(fence) {
			let rest = &text[start + fence.len()..];

			if let Some(end) = rest.find("```") {
				return rest[..end].trim();
			}
		}
	}

	text.trim()
}

#[cfg(test)]
mod tests {
	use super::*;

	use sift_domain::Role;

	#[test]
	fn parses_plain_json_plan() {
		let plan = parse_plan_response(
			"Who is the guy at Tencent?",
			r#"{"entity_keywords": "Tencent", "document_query": "Tencent employee"}"#,
		)
		.expect("plan missing");

		assert_eq!(plan.entity_keywords, "Tencent");
		assert_eq!(plan.document_query, "Tencent employee");
		assert!(!plan.degraded);
	}

	#[test]
	fn parses_fenced_json_plan() {
		let text = "Here you go:\n```json\n{\"entity_keywords\": \"Boston\", \"document_query\": \"companies in Boston\"}\n```";
		let plan = parse_plan_response("Companies from Boston", text).expect("plan missing");

		assert_eq!(plan.entity_keywords, "Boston");
	}

	#[test]
	fn missing_field_falls_back_to_raw_question() {
		let plan = parse_plan_response("Any meetings on Monday?", r#"{"entity_keywords": "Meeting Monday"}"#)
			.expect("plan missing");

		assert_eq!(plan.entity_keywords, "Meeting Monday");
		assert_eq!(plan.document_query, "Any meetings on Monday?");
	}

	#[test]
	fn prose_response_is_unusable() {
		assert!(parse_plan_response("q", "I could not produce a plan.").is_none());
	}

	#[test]
	fn history_is_embedded_in_the_system_message() {
		let history = vec![ConversationTurn {
			role: Role::User,
			text: "Tell me about Tencent.".to_string(),
		}];
		let messages = planner_messages("Who works there?", &history);
		let system = messages[0]["content"].as_str().unwrap_or_default();

		assert!(system.contains("CONVERSATION HISTORY"));
		assert!(system.contains("user: Tell me about Tencent."));
		assert_eq!(messages[1]["content"], "Who works there?");
	}
}
