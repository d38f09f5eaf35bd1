//! Observability helpers for token dispatch.
//!
//! - Every dispatch runs inside a span named `autodoc.token` carrying the `auth_type` and `stage`
//!   fields.
//! - Enable `metrics` to increment the `autodoc_token_total` counter for every
//!   attempt/success/failure, labeled by `auth_type` + `outcome`.
//! - Binaries install a formatting subscriber with [`init_subscriber`].

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Token issued.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl TokenOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOutcome::Attempt => "attempt",
			TokenOutcome::Success => "success",
			TokenOutcome::Failure => "failure",
		}
	}
}
impl Display for TokenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
