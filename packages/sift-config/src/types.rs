use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub pipeline: Pipeline,
	pub backends: Backends,
	pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

/// Knobs shared by every pipeline stage. All fields default so a config
/// file only has to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
	#[serde(default = "default_per_backend_timeout_ms")]
	pub per_backend_timeout_ms: u64,
	#[serde(default = "default_context_budget_chars")]
	pub context_budget_chars: usize,
	#[serde(default = "default_top_k_per_group")]
	pub top_k_per_group: usize,
	#[serde(default = "default_history_max_turns")]
	pub history_max_turns: usize,
}
impl Default for Pipeline {
	fn default() -> Self {
		Self {
			per_backend_timeout_ms: default_per_backend_timeout_ms(),
			context_budget_chars: default_context_budget_chars(),
			top_k_per_group: default_top_k_per_group(),
			history_max_turns: default_history_max_turns(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backends {
	pub base_url: String,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub password: Option<String>,
	pub persons: BackendConfig,
	pub companies: BackendConfig,
	pub notes: BackendConfig,
	pub documents: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
	pub index: String,
	#[serde(default = "default_backend_limit")]
	pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub planner: LlmProviderConfig,
	pub generator: LlmProviderConfig,
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_per_backend_timeout_ms() -> u64 {
	200
}

fn default_context_budget_chars() -> usize {
	8_000
}

fn default_top_k_per_group() -> usize {
	5
}

fn default_history_max_turns() -> usize {
	10
}

fn default_backend_limit() -> usize {
	10
}
