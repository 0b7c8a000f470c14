//! Thread-safe in-memory [`ContentStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	itinerary::{DocumentId, Itinerary},
	store::{ContentStore, StoreFuture},
};

type DocumentMap = Arc<RwLock<HashMap<DocumentId, Itinerary>>>;

/// Keeps itinerary documents in-process; the "most recent edit" is whatever was last
/// inserted, so the no-stale-read contract holds trivially.
#[derive(Clone, Debug, Default)]
pub struct MemoryContentStore(DocumentMap);
impl MemoryContentStore {
	/// Inserts or replaces a document under its own identifier.
	pub fn insert(&self, itinerary: Itinerary) {
		self.0.write().insert(itinerary.id.clone(), itinerary);
	}

	/// Removes a document, returning it when present.
	pub fn remove(&self, id: &DocumentId) -> Option<Itinerary> {
		self.0.write().remove(id)
	}

	fn fetch_now(map: DocumentMap, id: DocumentId) -> Option<Itinerary> {
		map.read().get(&id).cloned()
	}
}
impl ContentStore for MemoryContentStore {
	fn fetch_itinerary<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Option<Itinerary>> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Ok(Self::fetch_now(map, id)) })
	}
}
