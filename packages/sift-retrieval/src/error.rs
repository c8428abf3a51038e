pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes of one backend call. All of them are absorbed by the
/// retrieval coordinator; none aborts the overall request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Backend call timed out.")]
	Timeout,
	#[error("Backend is unavailable: {message}")]
	Unavailable { message: String },
	#[error("Backend returned a malformed response: {message}")]
	MalformedResponse { message: String },
}

impl Error {
	pub fn unavailable(message: impl Into<String>) -> Self {
		Self::Unavailable { message: message.into() }
	}

	pub fn malformed(message: impl Into<String>) -> Self {
		Self::MalformedResponse { message: message.into() }
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			return Self::Timeout;
		}
		if err.is_decode() {
			return Self::MalformedResponse { message: err.to_string() };
		}

		Self::Unavailable { message: err.to_string() }
	}
}
