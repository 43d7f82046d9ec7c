//! Observability for the client's two flows.
//!
//! [`observe`] wraps a flow in a `rkstudio_client.flow` span (fields `flow`, `stage`, and, once
//! the flow finishes, `outcome` + `elapsed_ms`), so failure events logged inside it are attributed
//! to the right call. With the `metrics` feature it also feeds:
//!
//! - `rkstudio_client_flow_total`: counter labeled by `flow` + `outcome` (`attempt` included).
//! - `rkstudio_client_flow_duration_seconds`: histogram labeled by `flow`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Flows performed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// JWT-bearer client assertion exchanged for an access token.
	TokenExchange,
	/// Authenticated GET against a REST resource.
	ResourceFetch,
}
impl FlowKind {
	/// Label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TokenExchange => "token_exchange",
			Self::ResourceFetch => "resource_fetch",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels; every flow records one [`FlowOutcome::Attempt`] plus its final outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// The flow returned a value.
	Success,
	/// The flow returned an error.
	Failure,
}
impl FlowOutcome {
	/// Classifies a finished flow.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(_) => Self::Failure,
		}
	}

	/// Label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `flow` inside a [`FlowSpan`] and records its attempt, outcome, and duration.
pub async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, flow: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);
	let started = Instant::now();

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.wrap(flow).await;
	let outcome = FlowOutcome::of(&result);
	let elapsed = started.elapsed();

	record_flow_outcome(kind, outcome);
	record_flow_duration(kind, elapsed);
	span.finish(outcome, elapsed);

	result
}
