use sift_domain::{HitKind, RawHit};

use crate::{
	Result, SearchClient, client,
	keyword::{meta_value, str_field},
};

/// Default field scope for autosuggest: names and titles plus the two
/// metadata fields users actually type prefixes of.
pub const SUGGEST_FIELDS: [&str; 4] = ["name", "title", "metadata.location", "metadata.designation"];

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Suggestion {
	pub label: String,
	pub context_hint: Option<String>,
	pub source_kind: HitKind,
}

/// Prefix-match lookup against one structured index. This is the whole
/// autosuggest collaborator: no planning, no synthesis, one cheap query.
pub async fn suggest(
	client: &SearchClient,
	index: &str,
	kind: HitKind,
	prefix: &str,
	fields: &[String],
	limit: usize,
) -> Result<Vec<Suggestion>> {
	if prefix.trim().is_empty() {
		return Ok(Vec::new());
	}

	let body = serde_json::json!({
		"query": {
			"multi_match": {
				"query": prefix,
				"fields": fields,
				"type": "phrase_prefix",
			}
		},
		"size": limit,
		"_source": ["id", "card_id", "name", "title", "metadata"],
	});
	let json = client.search(index, &body).await?;
	let hits = client::parse_search_hits(index, &json)?;

	Ok(hits.into_iter().filter_map(|hit| suggestion_from_hit(hit, kind)).collect())
}

fn suggestion_from_hit(hit: RawHit, kind: HitKind) -> Option<Suggestion> {
	let label = str_field(&hit.fields, "name")
		.or_else(|| str_field(&hit.fields, "title"))?
		.to_string();
	let context_hint = meta_value(&hit.fields, "designation")
		.or_else(|| meta_value(&hit.fields, "industry"))
		.or_else(|| meta_value(&hit.fields, "location"));

	Some(Suggestion { label, context_hint, source_kind: kind })
}
