//! HTTP-facing response contracts for the sign and export endpoints.
//!
//! The crate does not bind to a web framework; instead it exposes the exact header values
//! and error bodies the endpoints must emit, so any router can shape the response in a few
//! lines. Client-visible messages are short and non-technical; diagnostic detail stays in
//! the [`crate::error::Error`] values and server-side logs.

// self
use crate::{_prelude::*, render::ExportKind};

/// `Cache-Control` value for every export response; exported documents must always reflect
/// current data.
pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate";

/// Status category an [`Error`] maps onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
	/// Transient over-budget rejection; retry after the indicated delay.
	RateLimited,
	/// Invalid, expired, or malformed capability; re-sign to retry.
	Unauthorized,
	/// Document identifier does not resolve.
	NotFound,
	/// Malformed request parameters.
	BadRequest,
	/// Renderer, store, or configuration failure.
	ServerError,
}
impl StatusCategory {
	/// Equivalent HTTP status code.
	pub const fn http_status(self) -> u16 {
		match self {
			StatusCategory::RateLimited => 429,
			StatusCategory::Unauthorized => 401,
			StatusCategory::NotFound => 404,
			StatusCategory::BadRequest => 400,
			StatusCategory::ServerError => 500,
		}
	}
}

/// Structured failure body returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
	/// Status category; also drives the HTTP status code.
	pub status: StatusCategory,
	/// Short, non-technical message safe to show end users.
	pub message: String,
	/// `Retry-After` hint in whole seconds, present on rate rejections only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub retry_after_seconds: Option<i64>,
}
impl ErrorResponse {
	/// Maps a pipeline error onto its client-visible shape.
	///
	/// Never echoes secrets, digests, or engine diagnostics; those stay server-side.
	pub fn from_error(error: &Error) -> Self {
		match error {
			Error::RateLimited { retry_after } => Self {
				status: StatusCategory::RateLimited,
				message: "Too many requests. Please slow down and retry shortly.".into(),
				retry_after_seconds: Some(retry_after.whole_seconds().max(1)),
			},
			Error::Unauthorized { .. } => Self {
				status: StatusCategory::Unauthorized,
				message: "This export link is invalid or has expired. Please request a new one."
					.into(),
				retry_after_seconds: None,
			},
			Error::NotFound { .. } => Self {
				status: StatusCategory::NotFound,
				message: "We could not find that itinerary.".into(),
				retry_after_seconds: None,
			},
			Error::Validation(validation) => Self {
				status: StatusCategory::BadRequest,
				message: validation.to_string(),
				retry_after_seconds: None,
			},
			Error::Render(_) | Error::Store(_) | Error::Config(_) => Self {
				status: StatusCategory::ServerError,
				message: "The export could not be generated. Please try again.".into(),
				retry_after_seconds: None,
			},
		}
	}
}

/// Builds the `Content-Disposition` value for a download, RFC 5987 encoded.
pub fn attachment_disposition(filename: &str) -> String {
	format!("attachment; filename*=UTF-8''{}", rfc5987_encode(filename))
}

/// Derives the download filename from the client name and the render instant.
///
/// The timestamp keeps repeated exports from colliding in the client's download folder and
/// defeats client-side caching of identical names.
pub fn export_filename(client_name: &str, kind: ExportKind, now: OffsetDateTime) -> String {
	let mut stem = String::new();

	for c in client_name.chars() {
		if c.is_ascii_alphanumeric() {
			stem.push(c.to_ascii_lowercase());
		} else if !stem.ends_with('-') && !stem.is_empty() {
			stem.push('-');
		}
	}

	let stem = stem.trim_matches('-');
	let stem = if stem.is_empty() { "export" } else { stem };
	let date = now.date();
	let time = now.time();

	format!(
		"{stem}-itinerary-{:04}{:02}{:02}-{:02}{:02}{:02}.{}",
		date.year(),
		u8::from(date.month()),
		date.day(),
		time.hour(),
		time.minute(),
		time.second(),
		kind.file_extension(),
	)
}

// RFC 5987 attr-char set; everything else is percent-encoded from UTF-8 bytes.
fn rfc5987_encode(value: &str) -> String {
	let mut encoded = String::with_capacity(value.len());

	for byte in value.bytes() {
		let keep = byte.is_ascii_alphanumeric()
			|| matches!(byte, b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~');

		if keep {
			encoded.push(byte as char);
		} else {
			encoded.push_str(&format!("%{byte:02X}"));
		}
	}

	encoded
}
