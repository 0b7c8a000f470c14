//! HTML composition and the off-process PDF engine seam.
//!
//! [`compose_html`] builds a self-contained, escaped HTML representation of the itinerary;
//! a [`PdfEngine`] paginates and rasterizes it into PDF bytes. The engine is the pipeline's
//! highest-latency, highest-failure-surface collaborator, so it sits behind a trait
//! (swappable without touching the orchestrator) and behind a [`RenderGate`] whose RAII
//! guard is released on every exit path, including engine errors and caller cancellation.

// self
use crate::{_prelude::*, itinerary::Itinerary, render::RenderError};

/// Boxed future returned by [`PdfEngine::render`].
pub type EngineFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, RenderError>> + 'a + Send>>;

/// Off-process rendering engine contract: HTML in, PDF bytes out.
///
/// Implementations own their time bound; a render must never hang indefinitely. Dropping
/// the returned future is the cancellation path and must abort the in-flight work on a
/// best-effort basis (the bundled HTTP engine aborts by dropping its request).
pub trait PdfEngine
where
	Self: Send + Sync,
{
	/// Renders the HTML document into PDF bytes.
	fn render<'a>(&'a self, html: &'a str) -> EngineFuture<'a>;
}

/// Serializes access to the rendering engine.
///
/// The engine is a scoped resource: the guard is acquired before the render call and
/// dropped unconditionally afterwards, so no exit path can leave the engine claimed.
#[derive(Clone, Debug, Default)]
pub struct RenderGate(Arc<AsyncMutex<()>>);
impl RenderGate {
	/// Acquires the gate, suspending until the engine is free.
	pub async fn acquire(&self) -> async_lock::MutexGuard<'_, ()> {
		self.0.lock().await
	}
}

/// Composes the self-contained HTML document handed to the engine.
///
/// Pure and deterministic; all document-sourced strings are escaped.
pub fn compose_html(itinerary: &Itinerary) -> String {
	let mut html = format!(
		"<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
		<title>{title} Itinerary</title>\n\
		<style>\n\
		body {{ font-family: Georgia, serif; margin: 2em; color: #1d3557; }}\n\
		h1 {{ border-bottom: 2px solid #e63946; padding-bottom: 0.2em; }}\n\
		.day {{ margin: 1.2em 0; page-break-inside: avoid; }}\n\
		.day h2 {{ margin-bottom: 0.2em; }}\n\
		.slot {{ margin: 0.1em 0 0.1em 1em; }}\n\
		table {{ border-collapse: collapse; margin-top: 0.6em; }}\n\
		td, th {{ border: 1px solid #999; padding: 0.3em 0.6em; text-align: left; }}\n\
		.tag {{ display: inline-block; width: 0.8em; height: 0.8em; border-radius: 50%; }}\n\
		</style>\n</head>\n<body>\n\
		<h1>{title} Itinerary</h1>\n\
		<p>{range} &middot; {heads} travelers</p>\n",
		title = escape_html(&itinerary.client_name),
		range = escape_html(&crate::render::date_range(itinerary.start, itinerary.end)),
		heads = itinerary.head_count,
	);

	for day in &itinerary.days {
		html.push_str(&format!(
			"<div class=\"day\">\n<h2>{} ({})</h2>\n",
			escape_html(&day.title),
			crate::render::short_date(day.date),
		));

		for (label, value) in
			[("Morning", &day.morning), ("Afternoon", &day.afternoon), ("Evening", &day.evening)]
		{
			if !value.is_empty() {
				html.push_str(&format!(
					"<p class=\"slot\"><strong>{label}:</strong> {}</p>\n",
					escape_html(value),
				));
			}
		}

		if let Some(activities) = &day.activities {
			html.push_str("<ul>\n");

			for activity in activities {
				html.push_str(&format!("<li>{}</li>\n", escape_html(activity)));
			}

			html.push_str("</ul>\n");
		}

		for (label, note) in [("Lunch", &day.lunch), ("Dinner", &day.dinner)] {
			if let Some(note) = note {
				html.push_str(&format!(
					"<p class=\"slot\"><strong>{label}:</strong> {}</p>\n",
					escape_html(note),
				));
			}
		}

		html.push_str("</div>\n");
	}

	if !itinerary.hotels.is_empty() {
		html.push_str(
			"<h2>Hotels</h2>\n<table>\n\
			<tr><th></th><th>Group</th><th>Hotel</th><th>Dates</th><th>Note</th></tr>\n",
		);

		for booking in &itinerary.hotels {
			let tag = booking
				.color
				.as_deref()
				.map(|color| {
					format!("<span class=\"tag\" style=\"background:{}\"></span>", escape_html(color))
				})
				.unwrap_or_default();

			html.push_str(&format!(
				"<tr><td>{tag}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
				escape_html(&booking.group),
				escape_html(&booking.hotel),
				crate::render::date_range(booking.check_in, booking.check_out),
				escape_html(booking.note.as_deref().unwrap_or("")),
			));
		}

		html.push_str("</table>\n");
	}

	html.push_str("</body>\n</html>\n");

	html
}

fn escape_html(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for c in value.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}

	escaped
}

/// HTTP-backed engine posting the HTML to an off-process rendering service.
///
/// Fits browserless-style services exposing a `POST` endpoint that accepts
/// `{"html": "..."}` and answers with PDF bytes. Every request carries a hard
/// [`HttpPdfEngine::REQUEST_TIMEOUT`] so a wedged browser can never hang the pipeline.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct HttpPdfEngine {
	client: ReqwestClient,
	endpoint: Url,
}
#[cfg(feature = "reqwest")]
impl HttpPdfEngine {
	/// Hard per-request time bound.
	pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

	/// Creates an engine with a default client.
	pub fn new(endpoint: Url) -> Self {
		Self::with_client(ReqwestClient::default(), endpoint)
	}

	/// Creates an engine reusing a caller-provided client.
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint }
	}
}
#[cfg(feature = "reqwest")]
impl PdfEngine for HttpPdfEngine {
	fn render<'a>(&'a self, html: &'a str) -> EngineFuture<'a> {
		Box::pin(async move {
			let response = self
				.client
				.post(self.endpoint.clone())
				.timeout(Self::REQUEST_TIMEOUT)
				.json(&serde_json::json!({ "html": html }))
				.send()
				.await
				.map_err(map_engine_error)?;
			let status = response.status();

			if !status.is_success() {
				let message = response.text().await.unwrap_or_default();

				return Err(RenderError::Engine { message, status: Some(status.as_u16()) });
			}

			Ok(response.bytes().await.map_err(map_engine_error)?.to_vec())
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_engine_error(e: ReqwestError) -> RenderError {
	if e.is_timeout() { RenderError::Timeout } else { RenderError::network(e) }
}
