pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Provider call timed out.")]
	Timeout,
	#[error("Provider rejected the request with a rate limit.")]
	RateLimited,
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error(transparent)]
	Http(reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			return Self::Timeout;
		}
		if err.status().map(|status| status.as_u16() == 429).unwrap_or(false) {
			return Self::RateLimited;
		}

		Self::Http(err)
	}
}

impl Error {
	pub fn invalid_response(message: impl Into<String>) -> Self {
		Self::InvalidResponse { message: message.into() }
	}
}
