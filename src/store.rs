//! Content-store contracts and built-in implementations.
//!
//! The content-management backend owns itinerary documents; the pipeline only reads them.
//! [`ContentStore`] is the seam: bring any backend, or use [`HttpContentStore`] (feature
//! `reqwest`) against a JSON API and [`MemoryContentStore`] for tests and demos.

pub mod memory;
pub use memory::MemoryContentStore;
#[cfg(feature = "reqwest")] pub mod http;
#[cfg(feature = "reqwest")] pub use http::HttpContentStore;

// self
use crate::{_prelude::*, itinerary::{DocumentId, Itinerary}};

type BoxError = Box<dyn StdError + Send + Sync>;

/// Boxed future returned by [`ContentStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Read contract against the external content store.
///
/// Implementations must never serve a cached copy older than the most recent edit; every
/// export reflects current data.
pub trait ContentStore
where
	Self: Send + Sync,
{
	/// Resolves the itinerary snapshot for `id`, or `None` when the id does not exist.
	fn fetch_itinerary<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Option<Itinerary>>;
}

/// Error type produced by [`ContentStore`] implementations.
#[derive(Debug, ThisError)]
pub enum StoreError {
	/// Transport failure while reaching the backend.
	#[error("Network error occurred while calling the content store.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Backend answered with a non-success result.
	#[error("Content store failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Backend payload did not match the itinerary shape.
	#[error("Content store returned a malformed itinerary document.")]
	Decode {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl StoreError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for StoreError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
