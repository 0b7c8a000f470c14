// self
use crate::{obs::ExportOutcome, render::ExportKind};

/// Records an export outcome via the global metrics recorder (when enabled).
pub fn record_export_outcome(kind: ExportKind, outcome: ExportOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"itinerary_export_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
