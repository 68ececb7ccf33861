//! Remote fetching

// Imports
use {reqwest::header, std::time::Duration};

/// Response to a metadata-only request
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct HeadResponse {
	/// Status code
	pub status: u16,

	/// Reported content length, if any
	pub content_length: Option<u64>,
}

impl HeadResponse {
	/// Returns if the status is in the `2xx` range
	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Fetcher
///
/// Abstracts over the remote archive, manifest and weather endpoints.
pub trait Fetch {
	/// Requests only the metadata of `url`
	async fn head(&self, url: &str) -> Result<HeadResponse, FetchError>;

	/// Fetches the whole body of `url`.
	///
	/// Non-success statuses are returned as errors.
	async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Http fetcher
#[derive(Clone, Debug)]
pub struct HttpFetcher {
	/// Client
	client: reqwest::Client,
}

impl HttpFetcher {
	/// Creates a new fetcher, with a timeout for each request
	pub fn new(timeout: Duration) -> Result<Self, FetchError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(FetchError::Client)?;

		Ok(Self { client })
	}
}

impl Fetch for HttpFetcher {
	async fn head(&self, url: &str) -> Result<HeadResponse, FetchError> {
		let response = self
			.client
			.head(url)
			.send()
			.await
			.map_err(|err| FetchError::Request { url: url.to_owned(), err })?;

		// Note: We can't use `Response::content_length`, since the body
		//       of a `HEAD` response is always empty.
		let content_length = response
			.headers()
			.get(header::CONTENT_LENGTH)
			.and_then(|len| len.to_str().ok())
			.and_then(|len| len.parse::<u64>().ok());

		Ok(HeadResponse {
			status: response.status().as_u16(),
			content_length,
		})
	}

	async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|err| FetchError::Request { url: url.to_owned(), err })?;

		let status = response.status();
		if !status.is_success() {
			return Err(FetchError::Status {
				url:    url.to_owned(),
				status: status.as_u16(),
			});
		}

		let body = response
			.bytes()
			.await
			.map_err(|err| FetchError::Body { url: url.to_owned(), err })?;

		Ok(body.to_vec())
	}
}

/// Fetch error
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	/// Unable to build the client
	#[error("Unable to build http client")]
	Client(#[source] reqwest::Error),

	/// Unable to send the request
	#[error("Unable to send request to {url:?}")]
	Request {
		url: String,
		#[source]
		err: reqwest::Error,
	},

	/// Non-success status
	#[error("Request to {url:?} returned status {status}")]
	Status { url: String, status: u16 },

	/// Unable to read the body
	#[error("Unable to read response body of {url:?}")]
	Body {
		url: String,
		#[source]
		err: reqwest::Error,
	},
}

#[cfg(test)]
pub mod test {
	use {
		super::*,
		std::{
			collections::HashMap,
			sync::{Arc, Mutex},
		},
	};

	/// Fetcher serving canned responses
	#[derive(Clone, Default, Debug)]
	pub struct FakeFetcher {
		/// Responses to `HEAD` requests
		heads: Arc<Mutex<HashMap<String, HeadResponse>>>,

		/// Bodies for `GET` requests
		bodies: Arc<Mutex<HashMap<String, Vec<u8>>>>,

		/// All requested urls, in order
		requests: Arc<Mutex<Vec<String>>>,
	}

	impl FakeFetcher {
		/// Sets the response to `HEAD` requests of `url`
		pub fn set_head(&self, url: &str, status: u16, content_length: Option<u64>) {
			_ = self.heads.lock().expect("Poisoned").insert(url.to_owned(), HeadResponse {
				status,
				content_length,
			});
		}

		/// Serves `body` at `url`
		pub fn set_body(&self, url: &str, body: impl Into<Vec<u8>>) {
			_ = self.bodies.lock().expect("Poisoned").insert(url.to_owned(), body.into());
		}

		/// Removes the body at `url`
		pub fn remove_body(&self, url: &str) {
			_ = self.bodies.lock().expect("Poisoned").remove(url);
		}

		/// Returns all requested urls
		pub fn requests(&self) -> Vec<String> {
			self.requests.lock().expect("Poisoned").clone()
		}
	}

	impl Fetch for FakeFetcher {
		async fn head(&self, url: &str) -> Result<HeadResponse, FetchError> {
			self.requests.lock().expect("Poisoned").push(url.to_owned());
			Ok(self
				.heads
				.lock()
				.expect("Poisoned")
				.get(url)
				.copied()
				.unwrap_or(HeadResponse {
					status:         404,
					content_length: None,
				}))
		}

		async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
			self.requests.lock().expect("Poisoned").push(url.to_owned());
			self.bodies
				.lock()
				.expect("Poisoned")
				.get(url)
				.cloned()
				.ok_or_else(|| FetchError::Status {
					url:    url.to_owned(),
					status: 404,
				})
		}
	}

	#[test]
	fn success_range() {
		let response = |status| HeadResponse {
			status,
			content_length: None,
		};
		assert!(response(200).is_success(), "200 is a success");
		assert!(response(204).is_success(), "204 is a success");
		assert!(!response(304).is_success(), "304 is not a success");
		assert!(!response(404).is_success(), "404 is not a success");
	}
}
