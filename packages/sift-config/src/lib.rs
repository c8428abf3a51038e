mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	BackendConfig, Backends, Config, EmbeddingProviderConfig, LlmProviderConfig, Pipeline,
	Providers, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
	truncate_trailing_slash(&mut cfg.backends.base_url);
	truncate_trailing_slash(&mut cfg.providers.planner.api_base);
	truncate_trailing_slash(&mut cfg.providers.generator.api_base);
	truncate_trailing_slash(&mut cfg.providers.embedding.api_base);
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.backends.base_url.trim().is_empty() {
		return Err(Error::Validation {
			message: "backends.base_url must be non-empty.".to_string(),
		});
	}

	for (label, backend) in [
		("persons", &cfg.backends.persons),
		("companies", &cfg.backends.companies),
		("notes", &cfg.backends.notes),
		("documents", &cfg.backends.documents),
	] {
		if backend.index.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("backends.{label}.index must be non-empty."),
			});
		}
		if backend.limit == 0 {
			return Err(Error::Validation {
				message: format!("backends.{label}.limit must be greater than zero."),
			});
		}
	}

	if cfg.pipeline.per_backend_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "pipeline.per_backend_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.context_budget_chars == 0 {
		return Err(Error::Validation {
			message: "pipeline.context_budget_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.top_k_per_group == 0 {
		return Err(Error::Validation {
			message: "pipeline.top_k_per_group must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.history_max_turns == 0 {
		return Err(Error::Validation {
			message: "pipeline.history_max_turns must be greater than zero.".to_string(),
		});
	}

	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, temperature) in [
		("planner", cfg.providers.planner.temperature),
		("generator", cfg.providers.generator.temperature),
	] {
		if !temperature.is_finite() || temperature < 0.0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.temperature must be zero or greater."),
			});
		}
	}

	for (label, key) in [
		("planner", &cfg.providers.planner.api_key),
		("generator", &cfg.providers.generator.api_key),
		("embedding", &cfg.providers.embedding.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn truncate_trailing_slash(url: &mut String) {
	while url.ends_with('/') {
		url.pop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_toml() -> String {
		r#"
			[service]
			log_level = "info"

			[backends]
			base_url = "http://localhost:9200/"

			[backends.persons]
			index = "persons"

			[backends.companies]
			index = "companies"

			[backends.notes]
			index = "notes"
			limit = 15

			[backends.documents]
			index = "documents"
			limit = 5

			[providers.planner]
			api_base = "https://api.groq.com"
			api_key = "k"
			path = "/openai/v1/chat/completions"
			model = "planner-model"
			temperature = 0.1
			timeout_ms = 4000

			[providers.generator]
			api_base = "https://api.groq.com"
			api_key = "k"
			path = "/openai/v1/chat/completions"
			model = "generator-model"
			temperature = 0.3
			timeout_ms = 8000

			[providers.embedding]
			api_base = "https://api.example.com"
			api_key = "k"
			path = "/v1/embeddings"
			model = "embed-model"
			dimensions = 384
			timeout_ms = 2000
		"#
		.to_string()
	}

	#[test]
	fn defaults_fill_pipeline_section() {
		let mut cfg: Config = toml::from_str(&sample_toml()).expect("parse failed");

		normalize(&mut cfg);
		validate(&cfg).expect("validation failed");

		assert_eq!(cfg.pipeline.per_backend_timeout_ms, 200);
		assert_eq!(cfg.pipeline.context_budget_chars, 8_000);
		assert_eq!(cfg.pipeline.top_k_per_group, 5);
		assert_eq!(cfg.pipeline.history_max_turns, 10);
		assert_eq!(cfg.backends.persons.limit, 10);
		assert_eq!(cfg.backends.notes.limit, 15);
	}

	#[test]
	fn normalize_strips_trailing_slashes() {
		let mut cfg: Config = toml::from_str(&sample_toml()).expect("parse failed");

		normalize(&mut cfg);

		assert_eq!(cfg.backends.base_url, "http://localhost:9200");
	}

	#[test]
	fn rejects_zero_timeout() {
		let mut cfg: Config = toml::from_str(&sample_toml()).expect("parse failed");

		cfg.pipeline.per_backend_timeout_ms = 0;

		assert!(matches!(validate(&cfg), Err(Error::Validation { .. })));
	}

	#[test]
	fn rejects_empty_api_key() {
		let raw = sample_toml().replace("api_key = \"k\"", "api_key = \" \"");
		let cfg: Config = toml::from_str(&raw).expect("parse failed");

		assert!(matches!(validate(&cfg), Err(Error::Validation { .. })));
	}
}
