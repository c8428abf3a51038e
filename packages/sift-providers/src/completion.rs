use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use sift_config::LlmProviderConfig;

use crate::{Error, Result};

/// Chat-completion client for one configured model endpoint. The inner
/// reqwest client is reused across calls, so outbound connections are
/// pooled and bounded independently of request concurrency.
pub struct CompletionClient {
	cfg: LlmProviderConfig,
	http: Client,
}

impl CompletionClient {
	pub fn new(cfg: &LlmProviderConfig) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { cfg: cfg.clone(), http })
	}

	/// Sends one chat-completion request and returns the assistant text.
	pub async fn complete(&self, messages: &[Value]) -> Result<String> {
		let url = format!("{}{}", self.cfg.api_base, self.cfg.path);
		let body = serde_json::json!({
			"model": self.cfg.model,
			"temperature": self.cfg.temperature,
			"messages": messages,
		});
		let res = self
			.http
			.post(url)
			.headers(crate::auth_headers(&self.cfg.api_key, &self.cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_completion_response(json)
	}
}

fn parse_completion_response(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::invalid_response("Completion response is missing message content."))?;

	Ok(content.to_string())
}

/// Chat message in the wire shape the completions endpoint expects.
pub fn message(role: &str, content: &str) -> Value {
	serde_json::json!({ "role": role, "content": content })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "Jane Doe works at Tencent." } },
				{ "message": { "content": "unused second choice" } }
			]
		});

		assert_eq!(
			parse_completion_response(json).expect("parse failed"),
			"Jane Doe works at Tencent."
		);
	}

	#[test]
	fn missing_content_is_an_invalid_response() {
		let json = serde_json::json!({ "choices": [ { "message": {} } ] });

		assert!(matches!(
			parse_completion_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn message_builds_wire_shape() {
		let value = message("user", "hello");

		assert_eq!(value["role"], "user");
		assert_eq!(value["content"], "hello");
	}
}
