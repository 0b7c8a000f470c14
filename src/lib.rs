//! Rust’s turnkey itinerary export pipeline—capability-signed download links, in-process rate
//! governing, and pluggable document renderers in one crate built for production.
//!
//! The crate covers the whole authorization-and-generation path for turning an itinerary
//! document into a shareable artifact:
//!
//! - [`token`] signs and verifies the time-limited capability embedded in every export link.
//! - [`govern`] admits or rejects callers per client key before the expensive paths run.
//! - [`schedule`] expands a travel date range into calendar entries without touching
//!   human-edited days.
//! - [`render`] converts one itinerary snapshot into plain text, a spreadsheet workbook, or a
//!   paginated PDF, with the binary engines abstracted behind traits.
//! - [`export`] ties a validated request to the right renderer and shapes the download
//!   response.
//!
//! Content storage and rendering engines are collaborators, not dependencies: bring your own
//! [`store::ContentStore`] and [`render::pdf::PdfEngine`], or enable the default `reqwest`
//! feature for the batteries-included HTTP implementations.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod export;
pub mod govern;
pub mod http;
pub mod itinerary;
pub mod obs;
pub mod render;
pub mod schedule;
pub mod store;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience fixtures and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		export::Exporter,
		itinerary::{DayEntry, DocumentId, HotelBooking, Itinerary},
		render::{
			RenderError,
			pdf::{EngineFuture, PdfEngine},
			sheet::XmlSheetEncoder,
		},
		store::{ContentStore, MemoryContentStore},
		token::{SigningSecret, TokenSigner},
	};

	/// Signing secret shared by every test exporter.
	pub const TEST_SECRET: &str = "itinerary-test-secret";

	/// Stub engine that wraps the composed HTML into a fake PDF body without launching
	/// anything off-process.
	#[derive(Clone, Debug, Default)]
	pub struct StubPdfEngine {
		/// Forces every render to fail when set.
		pub fail: bool,
	}
	impl PdfEngine for StubPdfEngine {
		fn render<'a>(&'a self, html: &'a str) -> EngineFuture<'a> {
			Box::pin(async move {
				if self.fail {
					return Err(RenderError::Engine {
						message: "stub engine forced failure".into(),
						status: None,
					});
				}

				let mut bytes = b"%PDF-1.4\n".to_vec();

				bytes.extend_from_slice(html.as_bytes());

				Ok(bytes)
			})
		}
	}

	/// Builds an [`Exporter`] backed by an in-memory content store, the in-process governor,
	/// the built-in workbook encoder, and a stub PDF engine.
	pub fn build_test_exporter() -> (Exporter, Arc<MemoryContentStore>) {
		let store_backend = Arc::new(MemoryContentStore::default());
		let store: Arc<dyn ContentStore> = store_backend.clone();
		let signer = TokenSigner::new(
			SigningSecret::new(TEST_SECRET).expect("Test signing secret should be valid."),
		);
		let base =
			Url::parse("https://travel.example/api").expect("Test base URL should parse.");
		let exporter = Exporter::new(store, signer, base)
			.with_sheet_encoder(Arc::new(XmlSheetEncoder))
			.with_pdf_engine(Arc::new(StubPdfEngine::default()));

		(exporter, store_backend)
	}

	/// Seven-day fixture itinerary with one pre-edited day and two overlapping bookings.
	pub fn sample_itinerary(id: &str) -> Itinerary {
		let id = DocumentId::new(id).expect("Fixture document identifier should be valid.");
		let mut days =
			vec![DayEntry::synthesized(time::macros::date!(2026 - 02 - 23), "Reef day")];

		days[0].morning = "Boat leaves the pier at 08:00.".into();

		Itinerary {
			id,
			client_name: "Smith Family".into(),
			start: time::macros::date!(2026 - 02 - 20),
			end: time::macros::date!(2026 - 02 - 26),
			head_count: 4,
			days,
			hotels: vec![
				HotelBooking {
					hotel: "Harbor View Hotel".into(),
					check_in: time::macros::date!(2026 - 02 - 20),
					check_out: time::macros::date!(2026 - 02 - 23),
					group: "Parents".into(),
					note: Some("Sea-view double.".into()),
					color: Some("#2a9d8f".into()),
				},
				HotelBooking {
					hotel: "Garden Lodge".into(),
					check_in: time::macros::date!(2026 - 02 - 20),
					check_out: time::macros::date!(2026 - 02 - 26),
					group: "Kids".into(),
					note: None,
					color: None,
				},
			],
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Date, Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, itinerary_export as _, tokio as _};
