// self
use crate::{auth::IdentityContext, obs::LookupOutcome};

/// Records a lookup outcome via the global metrics recorder (when enabled).
pub fn record_lookup(context: &IdentityContext, outcome: LookupOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"credential_cache_lookup_total",
			"context" => context.to_string(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (context, outcome);
	}
}
