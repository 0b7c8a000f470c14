//! Export orchestration: admission, token verification, document fetch, render dispatch,
//! and response shaping.
//!
//! [`Exporter`] is the HTTP-facing aggregate. A request walks a straight-line sequence of
//! stages (rate check, token verification, document fetch, render, respond), suspending at
//! every I/O boundary and early-exiting into the [`Error`] taxonomy. Validation and
//! authorization failures are resolved here and never reach a renderer; renderer failures
//! are caught at the invocation boundary and surface to clients as a generic server error.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, ValidationError},
	govern::{ClientKey, MemoryGovernor, RateDecision, RateGovernor, RatePolicy},
	http,
	itinerary::DocumentId,
	obs::{self, ExportOutcome, ExportSpan},
	render::{
		ExportKind,
		pdf::{EngineFuture, PdfEngine, RenderGate, compose_html},
		sheet::{SheetEncoder, XmlSheetEncoder, build_workbook},
		text,
	},
	store::ContentStore,
	token::TokenSigner,
};

/// Per-endpoint admission budgets, scaled to resource cost.
///
/// Signing is a cheap metadata operation and gets the generous budget; PDF rendering is the
/// most expensive path and gets the strictest one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GovernorPolicies {
	/// Budget for the sign endpoint.
	pub sign: RatePolicy,
	/// Budget for text exports.
	pub text: RatePolicy,
	/// Budget for spreadsheet exports.
	pub excel: RatePolicy,
	/// Budget for PDF exports.
	pub pdf: RatePolicy,
}
impl GovernorPolicies {
	/// Budget for the export endpoint serving `kind`.
	pub fn for_kind(&self, kind: ExportKind) -> RatePolicy {
		match kind {
			ExportKind::Pdf => self.pdf,
			ExportKind::Excel => self.excel,
			ExportKind::Text => self.text,
		}
	}
}
impl Default for GovernorPolicies {
	fn default() -> Self {
		Self {
			sign: RatePolicy::per_minute(60),
			text: RatePolicy::per_minute(30),
			excel: RatePolicy::per_minute(30),
			pdf: RatePolicy::per_minute(10),
		}
	}
}

/// Parameters of a signed-URL request (`GET /sign?id=..&type=..`).
#[derive(Clone, Debug)]
pub struct SignRequest {
	/// Raw document identifier query parameter.
	pub id: String,
	/// Raw export kind query parameter.
	pub kind: String,
	/// Derived client key of the caller.
	pub client: ClientKey,
}

/// Signed export link produced by [`Exporter::sign_url`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedUrl {
	/// Complete export URL carrying the token and expiry query parameters.
	pub url: Url,
	/// Instant the embedded grant stops being valid.
	pub expires_at: OffsetDateTime,
}

/// Parameters of an export request (`GET /export/{id}/{type}?token=..&expires=..`).
#[derive(Clone, Debug)]
pub struct ExportRequest {
	/// Raw document identifier path segment.
	pub id: String,
	/// Raw export kind path segment.
	pub kind: String,
	/// Raw token query parameter.
	pub token: String,
	/// Raw expiry (epoch milliseconds) query parameter.
	pub expires: String,
	/// Derived client key of the caller.
	pub client: ClientKey,
}

/// Rendered document plus the response headers the export endpoint must emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportDocument {
	/// Rendered document bytes.
	pub bytes: Vec<u8>,
	/// `Content-Type` header value.
	pub content_type: &'static str,
	/// `Content-Disposition` header value (attachment + RFC 5987 filename).
	pub content_disposition: String,
	/// `Cache-Control` header value; always the no-store directive set.
	pub cache_control: &'static str,
}

/// Coordinates the export pipeline against one content store and one signing secret.
///
/// The exporter owns the governor, signer, renderer seams, and response policies so the
/// HTTP layer can stay a thin mapping between a router and [`SignRequest`] /
/// [`ExportRequest`] values.
#[derive(Clone)]
pub struct Exporter {
	store: Arc<dyn ContentStore>,
	governor: Arc<dyn RateGovernor>,
	signer: TokenSigner,
	sheet_encoder: Arc<dyn SheetEncoder>,
	pdf_engine: Arc<dyn PdfEngine>,
	render_gate: RenderGate,
	policies: GovernorPolicies,
	public_base: Url,
}
impl Exporter {
	/// Creates an exporter with the in-process governor, the built-in workbook encoder, and
	/// no PDF engine configured.
	///
	/// `public_base` is the externally visible base the signed export links are joined
	/// onto. Attach a real engine via [`Exporter::with_pdf_engine`]; until then PDF exports
	/// fail with a render error while text and spreadsheet exports work out of the box.
	pub fn new(store: Arc<dyn ContentStore>, signer: TokenSigner, public_base: Url) -> Self {
		Self {
			store,
			governor: Arc::new(MemoryGovernor::default()),
			signer,
			sheet_encoder: Arc::new(XmlSheetEncoder),
			pdf_engine: Arc::new(UnconfiguredPdfEngine),
			render_gate: RenderGate::default(),
			policies: GovernorPolicies::default(),
			public_base,
		}
	}

	/// Replaces the admission governor.
	pub fn with_governor(mut self, governor: Arc<dyn RateGovernor>) -> Self {
		self.governor = governor;

		self
	}

	/// Replaces the workbook encoder.
	pub fn with_sheet_encoder(mut self, encoder: Arc<dyn SheetEncoder>) -> Self {
		self.sheet_encoder = encoder;

		self
	}

	/// Attaches the off-process PDF engine.
	pub fn with_pdf_engine(mut self, engine: Arc<dyn PdfEngine>) -> Self {
		self.pdf_engine = engine;

		self
	}

	/// Overrides the per-endpoint admission budgets.
	pub fn with_policies(mut self, policies: GovernorPolicies) -> Self {
		self.policies = policies;

		self
	}

	/// Produces a signed export link for `(id, kind)`, expiring five minutes from now.
	pub fn sign_url(&self, request: SignRequest) -> Result<SignedUrl> {
		self.sign_url_at(request, OffsetDateTime::now_utc())
	}

	/// Produces a signed export link treating `now` as the current instant.
	///
	/// Governed only; no token is required to ask for one. Malformed `id`/`kind` values are
	/// rejected before any signing work happens.
	pub fn sign_url_at(&self, request: SignRequest, now: OffsetDateTime) -> Result<SignedUrl> {
		if let RateDecision::Rejected { retry_after } =
			self.governor.admit_at(&request.client, self.policies.sign, now)
		{
			return Err(Error::RateLimited { retry_after });
		}

		let id = DocumentId::new(&request.id).map_err(ValidationError::from)?;
		let kind = request.kind.parse::<ExportKind>()?;
		let grant = self.signer.sign_at(&id, kind, now);
		let mut url = self.public_base.clone();

		url.path_segments_mut()
			.map_err(|()| ConfigError::InvalidBaseUrl { url: self.public_base.clone() })?
			.pop_if_empty()
			.extend(["export", id.as_ref(), kind.as_str()]);
		url.query_pairs_mut()
			.append_pair("token", &grant.token)
			.append_pair("expires", &grant.expires_at_millis().to_string());

		Ok(SignedUrl { url, expires_at: grant.expires_at })
	}

	/// Runs the full export pipeline for `request`.
	pub async fn export(&self, request: ExportRequest) -> Result<ExportDocument> {
		self.export_at(request, OffsetDateTime::now_utc()).await
	}

	/// Runs the full export pipeline treating `now` as the current instant.
	///
	/// Deterministic variant used by tests and replay tooling; `now` drives admission,
	/// token expiry, and the filename timestamp alike.
	pub async fn export_at(
		&self,
		request: ExportRequest,
		now: OffsetDateTime,
	) -> Result<ExportDocument> {
		let kind = request.kind.parse::<ExportKind>()?;
		let span = ExportSpan::new(kind, "export");

		obs::record_export_outcome(kind, ExportOutcome::Attempt);

		let result = span.instrument(self.run_pipeline(request, kind, now)).await;

		match &result {
			Ok(_) => obs::record_export_outcome(kind, ExportOutcome::Success),
			Err(
				Error::RateLimited { .. }
				| Error::Unauthorized { .. }
				| Error::NotFound { .. }
				| Error::Validation(_),
			) => obs::record_export_outcome(kind, ExportOutcome::Rejected),
			Err(_) => obs::record_export_outcome(kind, ExportOutcome::Failure),
		}

		result
	}

	async fn run_pipeline(
		&self,
		request: ExportRequest,
		kind: ExportKind,
		now: OffsetDateTime,
	) -> Result<ExportDocument> {
		let id = DocumentId::new(&request.id).map_err(ValidationError::from)?;

		// Stage: rate check.
		if let RateDecision::Rejected { retry_after } =
			self.governor.admit_at(&request.client, self.policies.for_kind(kind), now)
		{
			return Err(Error::RateLimited { retry_after });
		}

		// Stage: token verification.
		if let Err(reason) =
			self.signer.verify_at(&id, kind, &request.token, &request.expires, now)
		{
			obs::log_token_rejection(kind, reason);

			return Err(Error::Unauthorized { reason });
		}

		// Stage: document fetch; the store contract forbids stale reads.
		let itinerary = self
			.store
			.fetch_itinerary(&id)
			.await?
			.ok_or_else(|| Error::NotFound { id: id.clone() })?;

		// Stage: render dispatch.
		let bytes = match kind {
			ExportKind::Text => text::render(&itinerary).into_bytes(),
			ExportKind::Excel => self.sheet_encoder.encode(&build_workbook(&itinerary))?,
			ExportKind::Pdf => {
				let html = compose_html(&itinerary);
				// The engine is claimed for exactly the duration of this call; the guard
				// drops on success, error, and cancellation alike.
				let _engine = self.render_gate.acquire().await;

				self.pdf_engine.render(&html).await?
			},
		};

		// Stage: respond.
		let filename = http::export_filename(&itinerary.client_name, kind, now);

		Ok(ExportDocument {
			bytes,
			content_type: kind.content_type(),
			content_disposition: http::attachment_disposition(&filename),
			cache_control: http::CACHE_CONTROL,
		})
	}
}
impl Debug for Exporter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Exporter")
			.field("public_base", &self.public_base.as_str())
			.field("policies", &self.policies)
			.finish()
	}
}

/// Placeholder engine used until [`Exporter::with_pdf_engine`] attaches a real one.
struct UnconfiguredPdfEngine;
impl PdfEngine for UnconfiguredPdfEngine {
	fn render<'a>(&'a self, _: &'a str) -> EngineFuture<'a> {
		Box::pin(async {
			Err(crate::render::RenderError::Engine {
				message: "no PDF engine configured".into(),
				status: None,
			})
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::_preludet::{build_test_exporter, sample_itinerary};

	const NOW: OffsetDateTime = datetime!(2026-02-20 10:00 UTC);

	fn client() -> ClientKey {
		ClientKey::new("203.0.113.7")
	}

	fn sign_request(id: &str, kind: &str) -> SignRequest {
		SignRequest { id: id.into(), kind: kind.into(), client: client() }
	}

	#[test]
	fn signed_url_carries_token_and_expiry() {
		let (exporter, _) = build_test_exporter();
		let signed = exporter
			.sign_url_at(sign_request("abc123", "text"), NOW)
			.expect("Sign request should succeed.");

		assert_eq!(signed.url.path(), "/api/export/abc123/text");
		assert!(signed.url.query_pairs().any(|(k, _)| k == "token"));
		assert!(
			signed
				.url
				.query_pairs()
				.any(|(k, v)| k == "expires" && v.parse::<i64>().is_ok()),
		);
		assert_eq!(signed.expires_at, NOW + TokenSigner::VALIDITY_WINDOW);
	}

	#[test]
	fn malformed_sign_parameters_fail_before_token_work() {
		let (exporter, _) = build_test_exporter();

		assert!(matches!(
			exporter.sign_url_at(sign_request("../etc", "text"), NOW),
			Err(Error::Validation(ValidationError::DocumentId(_))),
		));
		assert!(matches!(
			exporter.sign_url_at(sign_request("abc123", "zip"), NOW),
			Err(Error::Validation(ValidationError::UnknownExportKind { .. })),
		));
	}

	#[test]
	fn sign_endpoint_is_governed() {
		let (exporter, _) = build_test_exporter();

		for _ in 0..60 {
			exporter
				.sign_url_at(sign_request("abc123", "text"), NOW)
				.expect("Requests within the budget should be admitted.");
		}

		assert!(matches!(
			exporter.sign_url_at(sign_request("abc123", "text"), NOW),
			Err(Error::RateLimited { .. }),
		));
	}

	#[tokio::test]
	async fn export_round_trips_a_signed_text_link() {
		let (exporter, store) = build_test_exporter();

		store.insert(sample_itinerary("abc123"));

		let signed = exporter
			.sign_url_at(sign_request("abc123", "text"), NOW)
			.expect("Sign request should succeed.");
		let pairs: HashMap<_, _> = signed.url.query_pairs().into_owned().collect();
		let document = exporter
			.export_at(
				ExportRequest {
					id: "abc123".into(),
					kind: "text".into(),
					token: pairs["token"].clone(),
					expires: pairs["expires"].clone(),
					client: client(),
				},
				NOW + Duration::minutes(1),
			)
			.await
			.expect("Export within the validity window should succeed.");

		assert_eq!(document.content_type, "text/plain; charset=utf-8");
		assert_eq!(document.cache_control, "no-store, no-cache, must-revalidate");
		assert!(
			String::from_utf8(document.bytes)
				.expect("Text export should be UTF-8.")
				.starts_with("Smith Family Itinerary"),
		);
	}

	#[tokio::test]
	async fn unknown_documents_export_as_not_found() {
		let (exporter, _) = build_test_exporter();
		let grant = exporter
			.sign_url_at(sign_request("ghost", "text"), NOW)
			.expect("Sign request should succeed.");
		let pairs: HashMap<_, _> = grant.url.query_pairs().into_owned().collect();
		let error = exporter
			.export_at(
				ExportRequest {
					id: "ghost".into(),
					kind: "text".into(),
					token: pairs["token"].clone(),
					expires: pairs["expires"].clone(),
					client: client(),
				},
				NOW,
			)
			.await
			.expect_err("Missing documents should not export.");

		assert!(matches!(error, Error::NotFound { .. }));
	}
}
