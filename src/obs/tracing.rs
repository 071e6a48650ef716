// self
use crate::{_prelude::*, auth::IdentityContext};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedLogin<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedLogin<F> = F;

/// Span wrapping a cache lookup or a login flight for one identity context.
#[derive(Clone, Debug)]
pub struct LoginSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl LoginSpan {
	/// Creates a new span tagged with the provided context + stage.
	pub fn new(context: &IdentityContext, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("credential_cache.login", context = context.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (context, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedLogin<Fut>
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

/// Emits a `warn` event for a failed login (when tracing is enabled).
pub fn log_login_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			context = error.context().map(IdentityContext::as_str),
			transport = error.is_transport(),
			%error,
			"login failed"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

/// Emits a `debug` event when a fresh token is stored (when tracing is enabled).
pub fn log_token_stored(context: &IdentityContext, lifetime: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			context = context.as_str(),
			lifetime_secs = lifetime.whole_seconds(),
			"token stored"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (context, lifetime);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let context = IdentityContext::new("TenantAdmin").expect("Context fixture should be valid.");
		let span = LoginSpan::new(&context, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
