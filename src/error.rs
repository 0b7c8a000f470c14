//! Pipeline-level error types shared across the orchestrator, renderers, and stores.

// self
use crate::_prelude::*;

/// Pipeline-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical pipeline error exposed by public APIs.
///
/// Every failure path of an export request collapses into one of these variants, which
/// [`crate::http::ErrorResponse`] then maps onto a client-safe status and message. Renderer
/// and store diagnostics stay inside the variant payloads and are only ever logged
/// server-side.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Content-store failure while resolving a document.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem, fatal at startup.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Malformed request parameters or document data.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// A renderer or its external engine failed.
	#[error("{0}")]
	Render(
		#[from]
		#[source]
		crate::render::RenderError,
	),

	/// The governor rejected the request; retry after the indicated delay.
	#[error("Request rate limit exceeded; retry in {retry_after}.")]
	RateLimited {
		/// Time remaining until the caller's window resets.
		retry_after: Duration,
	},
	/// The capability token was rejected; not retryable without re-signing.
	#[error("Export token rejected: {reason}.")]
	Unauthorized {
		/// Specific rejection reason, kept for server-side logs.
		reason: crate::token::TokenRejection,
	},
	/// The document identifier does not resolve in the content store.
	#[error("Itinerary `{id}` was not found.")]
	NotFound {
		/// Identifier that failed to resolve.
		id: crate::itinerary::DocumentId,
	},
}

/// Configuration and startup failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// The shared signing secret is absent from the environment.
	#[error("Environment variable `{var}` is not set; the export pipeline cannot start.")]
	MissingSecret {
		/// Environment variable that was consulted.
		var: &'static str,
	},
	/// The shared signing secret resolved to an empty string.
	#[error("The signing secret must not be empty.")]
	EmptySecret,
	/// The public base URL cannot carry path segments (e.g. a `data:` URL).
	#[error("Public base URL `{url}` cannot address export endpoints.")]
	InvalidBaseUrl {
		/// Offending base URL.
		url: Url,
	},
}

/// Request- and document-validation failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Document identifier fell outside the allow-listed character class.
	#[error(transparent)]
	DocumentId(#[from] crate::itinerary::DocumentIdError),
	/// Export kind is not part of the closed enum.
	#[error("Unknown export kind `{value}`; expected pdf, excel, or text.")]
	UnknownExportKind {
		/// Raw value supplied by the caller.
		value: String,
	},
	/// Travel window runs backwards.
	#[error("Start date {start} is after end date {end}.")]
	InvalidRange {
		/// Supplied start date.
		start: Date,
		/// Supplied end date.
		end: Date,
	},
	/// Travel window exceeds the supported span.
	#[error("A {days}-day span exceeds the {max}-day maximum.")]
	SpanTooLong {
		/// Inclusive day count of the supplied range.
		days: i64,
		/// Maximum supported inclusive day count.
		max: i64,
	},
	/// A day entry falls outside the itinerary's travel window.
	#[error("Day entry {date} falls outside the travel window.")]
	DayOutsideRange {
		/// Offending entry date.
		date: Date,
	},
	/// Two day entries share a calendar date.
	#[error("Duplicate day entry for {date}.")]
	DuplicateDay {
		/// Duplicated entry date.
		date: Date,
	},
	/// A booking's check-in is not strictly before its check-out.
	#[error("Booking `{hotel}` must check in before it checks out.")]
	BookingOrder {
		/// Hotel name of the offending booking.
		hotel: String,
	},
}
