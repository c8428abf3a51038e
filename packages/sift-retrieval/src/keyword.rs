use std::sync::Arc;

use serde_json::{Map, Value};

use sift_domain::{BackendQuery, HitKind, NormalizedHit, QueryPlan, RawHit};

use crate::{BoxFuture, Result, SearchBackend, SearchClient, client, local_rank_scores};

/// Matching posture of a keyword backend. Strict requires most terms to
/// match (structured records), loose matches any term (free-text notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMode {
	Strict,
	Loose,
}

/// Keyword adapter over one structured index: persons, companies, or notes.
pub struct KeywordBackend {
	client: Arc<SearchClient>,
	kind: HitKind,
	mode: KeywordMode,
	index: String,
	limit: usize,
}

impl KeywordBackend {
	pub fn new(
		client: Arc<SearchClient>,
		kind: HitKind,
		mode: KeywordMode,
		cfg: &sift_config::BackendConfig,
	) -> Self {
		Self { client, kind, mode, index: cfg.index.clone(), limit: cfg.limit }
	}

	fn body(&self, query: &BackendQuery) -> Value {
		let mut multi_match = serde_json::json!({
			"query": query.query_text,
			"fields": query.fields,
			"fuzziness": "AUTO",
		});

		match self.mode {
			// Require most terms to hit so "Tencent CEO" does not match
			// every record containing "CEO".
			KeywordMode::Strict => {
				multi_match["minimum_should_match"] = Value::from("2<100%");
			},
			KeywordMode::Loose => {
				multi_match["operator"] = Value::from("or");
			},
		}

		serde_json::json!({
			"query": { "multi_match": multi_match },
			"size": query.limit,
		})
	}
}

impl SearchBackend for KeywordBackend {
	fn id(&self) -> &str {
		&self.index
	}

	fn kind(&self) -> HitKind {
		self.kind
	}

	fn query(&self, plan: &QueryPlan) -> BackendQuery {
		let fields = match self.mode {
			KeywordMode::Strict => vec!["*".to_string()],
			KeywordMode::Loose => {
				vec!["content".to_string(), "title".to_string(), "metadata.*".to_string()]
			},
		};

		BackendQuery {
			backend_id: self.index.clone(),
			query_text: plan.entity_keywords.clone(),
			fields,
			limit: self.limit,
		}
	}

	fn search<'a>(&'a self, query: &'a BackendQuery) -> BoxFuture<'a, Result<Vec<RawHit>>> {
		Box::pin(async move {
			let body = self.body(query);
			let json = self.client.search(&self.index, &body).await?;

			client::parse_search_hits(&self.index, &json)
		})
	}

	fn normalize(&self, hits: Vec<RawHit>) -> Vec<NormalizedHit> {
		let scores = local_rank_scores(&hits);

		hits.into_iter()
			.zip(scores)
			.map(|(hit, rank_score)| match self.kind {
				HitKind::Note => normalize_note(hit, rank_score),
				kind => normalize_record(hit, rank_score, kind),
			})
			.collect()
	}
}

const PERSON_FIELDS: [(&str, &str); 5] = [
	("Designation", "designation"),
	("Company", "company"),
	("Location", "location"),
	("Education", "education"),
	("Experience (years)", "experience_years"),
];
const COMPANY_FIELDS: [(&str, &str); 5] = [
	("Industry", "industry"),
	("Location", "location"),
	("Founded", "founded"),
	("Description", "description"),
	("Website", "website"),
];

fn normalize_record(hit: RawHit, rank_score: f32, kind: HitKind) -> NormalizedHit {
	let title = str_field(&hit.fields, "name")
		.or_else(|| str_field(&hit.fields, "title"))
		.unwrap_or("Unknown")
		.to_string();
	let labels: &[(&str, &str)] =
		if kind == HitKind::Person { &PERSON_FIELDS } else { &COMPANY_FIELDS };
	let metadata = labels
		.iter()
		.filter_map(|(label, key)| {
			meta_value(&hit.fields, key).map(|value| (label.to_string(), value))
		})
		.collect();

	NormalizedHit {
		kind,
		source_id: hit.source_id,
		display_title: title,
		rank_score,
		metadata,
		snippet: hit.snippet,
	}
}

fn normalize_note(hit: RawHit, rank_score: f32) -> NormalizedHit {
	let owner = meta_value(&hit.fields, "person_name")
		.or_else(|| meta_value(&hit.fields, "company_name"))
		.or_else(|| str_field(&hit.fields, "title").map(|t| t.to_string()))
		.unwrap_or_else(|| "Unknown Entity".to_string());
	let content = str_field(&hit.fields, "content")
		.or_else(|| str_field(&hit.fields, "note"))
		.map(|text| text.to_string());

	NormalizedHit {
		kind: HitKind::Note,
		source_id: hit.source_id,
		display_title: format!("Note for {owner}"),
		rank_score,
		metadata: Vec::new(),
		snippet: content.or(hit.snippet),
	}
}

pub(crate) fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
	fields.get(key).and_then(|v| v.as_str()).filter(|s| !s.trim().is_empty())
}

/// Reads `metadata.<key>` from a source document, rendering scalars to
/// text. Anything absent or non-scalar is omitted.
pub(crate) fn meta_value(fields: &Map<String, Value>, key: &str) -> Option<String> {
	let value = fields.get("metadata")?.as_object()?.get(key)?;

	match value {
		Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}
