use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};

use sift_domain::RawHit;

use crate::{Error, Result};

/// Low-level search transport shared by every backend adapter: one pooled
/// reqwest client against an Elasticsearch-compatible `_search` API.
pub struct SearchClient {
	http: Client,
	base_url: String,
	username: Option<String>,
	password: Option<String>,
}

impl SearchClient {
	pub fn new(cfg: &sift_config::Backends, timeout: Duration) -> Result<Self> {
		let http = Client::builder().timeout(timeout).build()?;

		Ok(Self {
			http,
			base_url: cfg.base_url.clone(),
			username: cfg.username.clone(),
			password: cfg.password.clone(),
		})
	}

	pub async fn search(&self, index: &str, body: &Value) -> Result<Value> {
		let url = format!("{}/{index}/_search", self.base_url);
		let mut request = self.http.post(url).json(body);

		if let Some(username) = &self.username {
			request = request.basic_auth(username, self.password.as_deref());
		}

		let res = request.send().await?.error_for_status()?;

		res.json().await.map_err(|err| Error::malformed(err.to_string()))
	}
}

/// Maps one `_search` response into backend-native hits. Hits without any
/// usable identifier are dropped; missing fields never fail the call.
pub(crate) fn parse_search_hits(backend_id: &str, json: &Value) -> Result<Vec<RawHit>> {
	let hits = json
		.get("hits")
		.and_then(|v| v.get("hits"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::malformed("Search response is missing hits array."))?;

	let mut parsed = Vec::with_capacity(hits.len());

	for hit in hits {
		let source = hit
			.get("_source")
			.and_then(|v| v.as_object())
			.cloned()
			.unwrap_or_else(Map::new);
		let Some(source_id) = hit_source_id(hit, &source) else {
			continue;
		};
		let score = hit.get("_score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
		let snippet = highlight_snippet(hit);

		parsed.push(RawHit {
			backend_id: backend_id.to_string(),
			source_id,
			score,
			fields: source,
			snippet,
		});
	}

	Ok(parsed)
}

fn hit_source_id(hit: &Value, source: &Map<String, Value>) -> Option<String> {
	for key in ["card_id", "id"] {
		if let Some(id) = source.get(key).and_then(|v| v.as_str()) {
			if !id.is_empty() {
				return Some(id.to_string());
			}
		}
	}

	hit.get("_id").and_then(|v| v.as_str()).map(|id| id.to_string())
}

fn highlight_snippet(hit: &Value) -> Option<String> {
	let highlight = hit.get("highlight")?;

	for field in ["content", "title"] {
		if let Some(fragment) = highlight
			.get(field)
			.and_then(|v| v.as_array())
			.and_then(|arr| arr.first())
			.and_then(|v| v.as_str())
		{
			return Some(fragment.to_string());
		}
	}

	None
}
