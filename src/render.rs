//! Document renderers sharing the itinerary input contract.
//!
//! Three independent conversions of one [`crate::itinerary::Itinerary`] snapshot:
//!
//! - [`text`]: deterministic, synchronous plain-text transcript.
//! - [`sheet`]: logical workbook model handed to a [`sheet::SheetEncoder`].
//! - [`pdf`]: HTML composition handed to an off-process [`pdf::PdfEngine`].
//!
//! The binary engines behind the spreadsheet and PDF paths are capabilities, not
//! dependencies; the traits here are the swap points.

pub mod pdf;
pub mod sheet;
pub mod text;

// crates.io
use time::Month;
// self
use crate::{_prelude::*, error::ValidationError};

type BoxError = Box<dyn StdError + Send + Sync>;

/// Closed set of supported export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportKind {
	/// Paginated PDF via an off-process rendering engine.
	Pdf,
	/// Spreadsheet workbook.
	Excel,
	/// Line-oriented plain text.
	Text,
}
impl ExportKind {
	/// Returns a stable label suitable for URLs, span, or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExportKind::Pdf => "pdf",
			ExportKind::Excel => "excel",
			ExportKind::Text => "text",
		}
	}

	/// `Content-Type` of the rendered document.
	pub const fn content_type(self) -> &'static str {
		match self {
			ExportKind::Pdf => "application/pdf",
			ExportKind::Excel => "application/vnd.ms-excel",
			ExportKind::Text => "text/plain; charset=utf-8",
		}
	}

	/// Filename extension of the rendered document.
	pub const fn file_extension(self) -> &'static str {
		match self {
			ExportKind::Pdf => "pdf",
			ExportKind::Excel => "xls",
			ExportKind::Text => "txt",
		}
	}
}
impl Display for ExportKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ExportKind {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pdf" => Ok(ExportKind::Pdf),
			"excel" => Ok(ExportKind::Excel),
			"text" => Ok(ExportKind::Text),
			other => Err(ValidationError::UnknownExportKind { value: other.to_owned() }),
		}
	}
}

/// Error type produced by renderers and their external engines.
///
/// The full payload is for server-side logs only; clients receive the generic
/// server-error message from [`crate::http::ErrorResponse`].
#[derive(Debug, ThisError)]
pub enum RenderError {
	/// The external engine reported a failure.
	#[error("Rendering engine failure: {message}.")]
	Engine {
		/// Engine-supplied diagnostic payload.
		message: String,
		/// HTTP status code, when the engine is reached over HTTP.
		status: Option<u16>,
	},
	/// The external engine did not answer within its time bound.
	#[error("Rendering engine timed out.")]
	Timeout,
	/// The workbook encoder rejected the logical model.
	#[error("Workbook encoding failed: {message}.")]
	Encode {
		/// Encoder-supplied diagnostic payload.
		message: String,
	},
	/// Transport failure while reaching an engine.
	#[error("Network error occurred while calling the rendering engine.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl RenderError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

pub(crate) fn short_date(date: Date) -> String {
	format!("{} {}", month_abbr(date.month()), date.day())
}

pub(crate) fn date_range(from: Date, to: Date) -> String {
	format!("{} - {}", short_date(from), short_date(to))
}

fn month_abbr(month: Month) -> &'static str {
	match month {
		Month::January => "Jan",
		Month::February => "Feb",
		Month::March => "Mar",
		Month::April => "Apr",
		Month::May => "May",
		Month::June => "Jun",
		Month::July => "Jul",
		Month::August => "Aug",
		Month::September => "Sep",
		Month::October => "Oct",
		Month::November => "Nov",
		Month::December => "Dec",
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;

	#[test]
	fn export_kind_parses_the_closed_enum_only() {
		assert_eq!("pdf".parse::<ExportKind>(), Ok(ExportKind::Pdf));
		assert_eq!("excel".parse::<ExportKind>(), Ok(ExportKind::Excel));
		assert_eq!("text".parse::<ExportKind>(), Ok(ExportKind::Text));
		assert!(matches!(
			"zip".parse::<ExportKind>(),
			Err(ValidationError::UnknownExportKind { value }) if value == "zip",
		));
		// Case-sensitive on purpose; the sign endpoint emits lowercase.
		assert!("PDF".parse::<ExportKind>().is_err());
	}

	#[test]
	fn content_types_match_kinds() {
		assert_eq!(ExportKind::Pdf.content_type(), "application/pdf");
		assert_eq!(ExportKind::Excel.file_extension(), "xls");
		assert_eq!(ExportKind::Text.content_type(), "text/plain; charset=utf-8");
	}

	#[test]
	fn dates_abbreviate_for_display() {
		assert_eq!(short_date(date!(2026 - 02 - 20)), "Feb 20");
		assert_eq!(date_range(date!(2026 - 02 - 20), date!(2026 - 03 - 02)), "Feb 20 - Mar 2");
	}
}
