//! HTTP-backed [`ContentStore`] for JSON content-management APIs.

// crates.io
use reqwest::header::{CACHE_CONTROL, PRAGMA};
// self
use crate::{
	_prelude::*,
	itinerary::{DocumentId, Itinerary},
	store::{ContentStore, StoreError, StoreFuture},
};

/// Reads itinerary documents from `GET {base}/itineraries/{id}`.
///
/// Every request carries `Cache-Control: no-cache` and `Pragma: no-cache` so neither the
/// backend nor a CDN in front of it may answer from cache; an export must reflect the most
/// recent edit.
#[derive(Clone, Debug)]
pub struct HttpContentStore {
	client: ReqwestClient,
	base: Url,
}
impl HttpContentStore {
	/// Creates a store with a default client.
	pub fn new(base: Url) -> Self {
		Self::with_client(ReqwestClient::default(), base)
	}

	/// Creates a store reusing a caller-provided client.
	pub fn with_client(client: ReqwestClient, base: Url) -> Self {
		Self { client, base }
	}

	fn document_url(&self, id: &DocumentId) -> Result<Url, StoreError> {
		let mut url = self.base.clone();

		url.path_segments_mut()
			.map_err(|()| StoreError::Backend {
				message: "content store base URL cannot carry path segments".into(),
				status: None,
			})?
			.pop_if_empty()
			.extend(["itineraries", id.as_ref()]);

		Ok(url)
	}

	async fn fetch(&self, id: &DocumentId) -> Result<Option<Itinerary>, StoreError> {
		let response = self
			.client
			.get(self.document_url(id)?)
			.header(CACHE_CONTROL, "no-cache")
			.header(PRAGMA, "no-cache")
			.send()
			.await?;
		let status = response.status();

		if status.as_u16() == 404 {
			return Ok(None);
		}
		if !status.is_success() {
			return Err(StoreError::Backend {
				message: format!("content store answered {status}"),
				status: Some(status.as_u16()),
			});
		}

		let bytes = response.bytes().await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
		let itinerary = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| StoreError::Decode { source })?;

		Ok(Some(itinerary))
	}
}
impl ContentStore for HttpContentStore {
	fn fetch_itinerary<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Option<Itinerary>> {
		Box::pin(self.fetch(id))
	}
}
