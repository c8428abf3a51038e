mod answer;
mod generate;
mod plan;
mod retrieve;
mod synthesize;

pub use answer::AnswerResponse;
pub use retrieve::RetrievalOutcome;
pub use synthesize::synthesize;

use std::sync::Arc;

use serde_json::Value;

use sift_config::Config;
use sift_providers::{CompletionClient, EmbeddingClient};
use sift_retrieval::{BoxFuture, SearchBackend};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to initialize retrieval backends: {source}")]
	InitRetrieval { source: sift_retrieval::Error },
	#[error("Failed to initialize inference clients: {source}")]
	InitProviders { source: sift_providers::Error },
	/// The only terminal failure of a request. Planner and backend
	/// failures degrade; a dead generator has nothing left to degrade to.
	#[error("Answer generation failed: {source}")]
	Generation { source: sift_providers::Error },
}

/// Language-model inference seam. The pipeline only ever sends messages
/// and reads text back; tests substitute scripted implementations.
pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		messages: &'a [Value],
	) -> BoxFuture<'a, sift_providers::Result<String>>;
}

impl CompletionProvider for CompletionClient {
	fn complete<'a>(
		&'a self,
		messages: &'a [Value],
	) -> BoxFuture<'a, sift_providers::Result<String>> {
		Box::pin(self.complete(messages))
	}
}

/// The whole answer pipeline: planner, retrieval fan-out, synthesis, and
/// generation behind one `answer` boundary. Holds no per-request state;
/// one instance serves concurrent requests.
pub struct Pipeline {
	pub cfg: Config,
	pub backends: Vec<Arc<dyn SearchBackend>>,
	pub planner: Arc<dyn CompletionProvider>,
	pub generator: Arc<dyn CompletionProvider>,
}

impl Pipeline {
	/// Standard wiring: HTTP search backends and completion clients built
	/// from configuration.
	pub fn from_config(cfg: Config) -> Result<Self> {
		let embedding = Arc::new(
			EmbeddingClient::new(&cfg.providers.embedding)
				.map_err(|source| Error::InitProviders { source })?,
		);
		let backends = sift_retrieval::standard_backends(&cfg, embedding)
			.map_err(|source| Error::InitRetrieval { source })?;
		let planner = Arc::new(
			CompletionClient::new(&cfg.providers.planner)
				.map_err(|source| Error::InitProviders { source })?,
		);
		let generator = Arc::new(
			CompletionClient::new(&cfg.providers.generator)
				.map_err(|source| Error::InitProviders { source })?,
		);

		Ok(Self { cfg, backends, planner, generator })
	}
}
