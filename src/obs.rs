//! Optional observability helpers for the export pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `itinerary_export.pipeline` with the
//!   `kind` (export format) and `stage` (call site) fields, plus warn-level records for
//!   token rejections.
//! - Enable `metrics` to increment the `itinerary_export_total` counter for every
//!   attempt/success/rejection/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each export attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportOutcome {
	/// Entry into the pipeline.
	Attempt,
	/// Document rendered and shaped successfully.
	Success,
	/// Request turned away before rendering (rate, token, or lookup).
	Rejected,
	/// Renderer or store failure propagated back to the caller.
	Failure,
}
impl ExportOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExportOutcome::Attempt => "attempt",
			ExportOutcome::Success => "success",
			ExportOutcome::Rejected => "rejected",
			ExportOutcome::Failure => "failure",
		}
	}
}
impl Display for ExportOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
