use std::collections::BTreeSet;

use serde_json::Value;

use sift_domain::{Answer, ContextWindow, ConversationTurn, bounded_tail};
use sift_providers::completion::message;

use crate::{Error, Pipeline, Result};

const GENERATOR_RULES: &str = "FORMATTING RULES:\n\
1. Use clean Markdown: bold entity names, bullet points for lists, nested \
bullets for details such as Location and Founded.\n\
2. Database records outrank notes, and notes outrank document excerpts; \
when the user asks for a list, only list database records.\n\
3. CITATIONS: every fact taken from the CONTEXT must cite the source tag \
of the entry it came from, in square brackets, e.g. [person:p1] or \
[document:d41]. Do not invent tags.\n\
4. If the CONTEXT is empty or irrelevant, state plainly that no matching \
information was found. Do not speculate.\n\
5. No fluff: answer directly, never open with \"Here is the information\".";

impl Pipeline {
	/// One inference call producing the final cited answer. The only error
	/// this can return is `Error::Generation`; an empty context is not a
	/// failure, the model is asked to say it found nothing.
	pub async fn generate(
		&self,
		question: &str,
		context: &ContextWindow,
		history: &[ConversationTurn],
	) -> Result<Answer> {
		let messages = generator_messages(
			question,
			context,
			bounded_tail(history, self.cfg.pipeline.history_max_turns),
		);
		let text = self
			.generator
			.complete(&messages)
			.await
			.map_err(|source| Error::Generation { source })?;
		let known_tags = context.source_tags();
		let cited_sources = extract_citations(&text, &known_tags);

		if cited_sources.is_empty() && !known_tags.is_empty() {
			// Prompt-level contract only; log it, do not fail the request.
			tracing::warn!("Answer cites no sources although context was non-empty.");
		}

		Ok(Answer { text, cited_sources })
	}
}

pub(crate) fn generator_messages(
	question: &str,
	context: &ContextWindow,
	history: &[ConversationTurn],
) -> Vec<Value> {
	let serialized = context.serialize();
	let context_block = if serialized.is_empty() { "(no matching records)" } else { &serialized };
	let system = format!(
		"You are a professional assistant answering questions over a private \
corpus of people, companies, notes, and uploaded documents.\n\n\
CONTEXT:\n{context_block}\n\n{GENERATOR_RULES}"
	);
	let mut messages = vec![message("system", &system)];

	for turn in history {
		messages.push(message(turn.role.as_str(), &turn.text));
	}

	messages.push(message("user", question));

	messages
}

/// Collects the bracketed source tags the model actually used, restricted
/// to tags present in the context so hallucinated tags never count.
pub(crate) fn extract_citations(text: &str, known: &BTreeSet<String>) -> BTreeSet<String> {
	let mut cited = BTreeSet::new();
	let mut rest = text;

	while let Some(start) = rest.find('[') {
		let after = &rest[start + 1..];
		let Some(end) = after.find(']') else {
			break;
		};
		let tag = &after[..end];

		if known.contains(tag) {
			cited.insert(tag.to_string());
		}

		rest = &after[end + 1..];
	}

	cited
}

#[cfg(test)]
mod tests {
	use super::*;

	use sift_domain::{HitKind, NormalizedHit};

	fn known(tags: &[&str]) -> BTreeSet<String> {
		tags.iter().map(|tag| tag.to_string()).collect()
	}

	#[test]
	fn extracts_only_known_tags() {
		let text =
			"**Jane Doe** [person:p1] appears in the roster [document:d1], see also [made:up].";
		let cited = extract_citations(text, &known(&["person:p1", "document:d1"]));

		assert_eq!(cited, known(&["person:p1", "document:d1"]));
	}

	#[test]
	fn unclosed_bracket_stops_the_scan() {
		let cited = extract_citations("broken [person:p1", &known(&["person:p1"]));

		assert!(cited.is_empty());
	}

	#[test]
	fn empty_context_renders_a_placeholder_block() {
		let window = ContextWindow::empty(8_000);
		let messages = generator_messages("anything?", &window, &[]);
		let system = messages[0]["content"].as_str().unwrap_or_default();

		assert!(system.contains("(no matching records)"));
	}

	#[test]
	fn history_is_replayed_between_system_and_question() {
		use sift_domain::Role;

		let window = ContextWindow {
			sections: vec![(
				HitKind::Person,
				vec![NormalizedHit {
					kind: HitKind::Person,
					source_id: "p1".to_string(),
					display_title: "Jane Doe".to_string(),
					rank_score: 1.0,
					metadata: Vec::new(),
					snippet: None,
				}],
			)],
			budget: 8_000,
		};
		let history = vec![
			ConversationTurn { role: Role::User, text: "earlier question".to_string() },
			ConversationTurn { role: Role::Assistant, text: "earlier answer".to_string() },
		];
		let messages = generator_messages("follow-up", &window, &history);

		assert_eq!(messages.len(), 4);
		assert_eq!(messages[1]["role"], "user");
		assert_eq!(messages[2]["role"], "assistant");
		assert_eq!(messages[3]["content"], "follow-up");
		assert!(messages[0]["content"].as_str().unwrap_or_default().contains("[person:p1]"));
	}
}
