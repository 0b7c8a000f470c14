// self
use crate::{_prelude::*, render::ExportKind, token::TokenRejection};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedExport<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedExport<F> = F;

/// A span builder used by the export pipeline.
#[derive(Clone, Debug)]
pub struct ExportSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExportSpan {
	/// Creates a new span tagged with the export kind + stage.
	pub fn new(kind: ExportKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("itinerary_export.pipeline", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedExport<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs the specific rejection reason server-side; clients only ever see the generic
/// unauthorized message.
pub fn log_token_rejection(kind: ExportKind, reason: TokenRejection) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(kind = kind.as_str(), reason = reason.as_str(), "export token rejected");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, reason);
	}
}
