// self
use crate::{auth::AuthType, obs::TokenOutcome};

/// Records a dispatch outcome via the global metrics recorder (when enabled).
pub fn record_token_outcome(auth_type: AuthType, outcome: TokenOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"autodoc_token_total",
			"auth_type" => auth_type.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (auth_type, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_token_outcome_noop_without_recorder() {
		record_token_outcome(AuthType::Lambda, TokenOutcome::Failure);
	}
}
