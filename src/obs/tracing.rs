// std
use std::time::Duration as StdDuration;
// crates.io
use tracing::{Instrument, Span, field::Empty, instrument::Instrumented};
// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Span wrapping one flow; `outcome` and `elapsed_ms` stay empty until [`FlowSpan::finish`].
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	span: Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let span = tracing::info_span!(
			"rkstudio_client.flow",
			flow = kind.as_str(),
			stage,
			outcome = Empty,
			elapsed_ms = Empty
		);

		Self { kind, span }
	}

	/// Runs `fut` inside the span without holding an entered guard across `.await` points.
	pub fn wrap<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}

	/// Fills in the closing fields and emits the completion event.
	pub fn finish(&self, outcome: FlowOutcome, elapsed: StdDuration) {
		let elapsed_ms = elapsed.as_millis() as u64;

		self.span.record("outcome", outcome.as_str());
		self.span.record("elapsed_ms", elapsed_ms);
		self.span.in_scope(|| {
			tracing::debug!(flow = %self.kind, %outcome, elapsed_ms, "Flow finished.");
		});
	}
}
