//! Single-flight login coordination.
//!
//! Every identity context owns one flight: an async mutex that only the caller performing a
//! login holds across the gateway call, plus a settle counter. A caller snapshots the counter,
//! waits for the mutex, and if the counter moved in the meantime it was queued behind a login
//! that already settled, so it takes that login's outcome (token *or* error) instead of issuing a
//! second call. Flights for different contexts never share a lock, so a hanging login for one
//! actor cannot delay another.

mod metrics;

pub use self::metrics::LoginMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::{IdentityContext, TokenEntry},
	cache::CacheOptions,
	gateway::{AuthGateway, LoginRequest},
	obs::{self, LoginSpan, LookupOutcome},
	resolver::ContextResolver,
};

type FlightTable = HashMap<IdentityContext, Arc<Flight>>;

#[derive(Debug, Default)]
struct Flight {
	settled: AtomicU64,
	last: AsyncMutex<Option<Result<TokenEntry>>>,
}

/// Ensures at most one outstanding gateway login per identity context.
///
/// Logins are bounded with `tokio::time::timeout`, so they must be driven inside a Tokio runtime
/// with the time driver enabled.
pub struct LoginCoordinator {
	resolver: Arc<ContextResolver>,
	gateway: Arc<dyn AuthGateway>,
	options: CacheOptions,
	metrics: Arc<LoginMetrics>,
	flights: Mutex<FlightTable>,
}
impl LoginCoordinator {
	/// Creates a coordinator over the provided resolver and gateway.
	pub fn new(
		resolver: Arc<ContextResolver>,
		gateway: Arc<dyn AuthGateway>,
		options: CacheOptions,
	) -> Self {
		Self {
			resolver,
			gateway,
			options,
			metrics: Default::default(),
			flights: Default::default(),
		}
	}

	/// Shares an externally owned metrics recorder.
	pub fn with_metrics(mut self, metrics: Arc<LoginMetrics>) -> Self {
		self.metrics = metrics;

		self
	}

	/// Counters for flights driven by this coordinator.
	pub fn metrics(&self) -> &LoginMetrics {
		&self.metrics
	}

	/// Resolver consulted at the start of each flight.
	pub fn resolver(&self) -> &ContextResolver {
		&self.resolver
	}

	/// Performs a login for `context`, or joins the one already in flight.
	///
	/// All callers that attach to the same flight observe the same outcome. Once the flight
	/// settles, successful or not, the next call starts a brand-new attempt.
	pub async fn login(&self, context: &IdentityContext) -> Result<TokenEntry> {
		self.login_with(context, || None, |_| ()).await
	}

	/// Returns `true` while a caller is inside the flight for `context`.
	pub fn in_flight(&self, context: &IdentityContext) -> bool {
		self.flights.lock().get(context).is_some_and(|flight| flight.last.try_lock().is_none())
	}

	/// Forgets every flight. Callers already attached to a flight still receive its outcome;
	/// later callers start new flights.
	pub fn abandon_all(&self) {
		self.flights.lock().clear();
	}

	/// Single-flight core shared with the cache.
	///
	/// `fresh` runs once the flight is acquired and short-circuits the login when a usable entry
	/// appeared while waiting. `store` runs on success before the flight is released, so the
	/// entry is visible to `fresh` for every caller queued behind this one.
	pub(crate) async fn login_with<F, S>(
		&self,
		context: &IdentityContext,
		fresh: F,
		store: S,
	) -> Result<TokenEntry>
	where
		F: FnOnce() -> Option<TokenEntry>,
		S: FnOnce(&TokenEntry),
	{
		if !self.resolver.contains(context) {
			let err = Error::CredentialsNotConfigured { context: context.clone() };

			self.metrics.record_failure();
			obs::record_lookup(context, LookupOutcome::Failure);
			obs::log_login_failure(&err);

			return Err(err);
		}

		let flight = self.flight(context);
		let seen = flight.settled.load(Ordering::Acquire);
		let mut last = flight.last.lock().await;

		if flight.settled.load(Ordering::Acquire) != seen {
			if let Some(outcome) = last.as_ref() {
				self.metrics.record_join();
				obs::record_lookup(context, LookupOutcome::Joined);

				return outcome.clone();
			}
		}
		if let Some(entry) = fresh() {
			return Ok(entry);
		}

		let span = LoginSpan::new(context, "gateway_login");
		let outcome = span.instrument(self.perform(context)).await;

		match &outcome {
			Ok(entry) => {
				store(entry);
				self.metrics.record_success();
				obs::record_lookup(context, LookupOutcome::Success);
			},
			Err(err) => {
				self.metrics.record_failure();
				obs::record_lookup(context, LookupOutcome::Failure);
				obs::log_login_failure(err);
			},
		}

		*last = Some(outcome.clone());

		flight.settled.fetch_add(1, Ordering::Release);

		outcome
	}

	fn flight(&self, context: &IdentityContext) -> Arc<Flight> {
		let mut flights = self.flights.lock();

		flights.entry(context.clone()).or_default().clone()
	}

	async fn perform(&self, context: &IdentityContext) -> Result<TokenEntry> {
		let credentials = self.resolver.resolve(context)?;
		let request = LoginRequest { context, credentials: &credentials };
		let timeout = self.options.login_timeout();
		let issued_at = OffsetDateTime::now_utc();

		self.metrics.record_gateway_call();

		let grant = match tokio::time::timeout(timeout.unsigned_abs(), self.gateway.login(request))
			.await
		{
			Ok(Ok(grant)) => grant,
			Ok(Err(err)) => return Err(err.into_error(context, timeout)),
			Err(_) => return Err(Error::GatewayTimeout { context: context.clone(), timeout }),
		};
		let expires_at =
			self.options.policy().expires_at(issued_at, grant.expires_in).ok_or_else(|| {
				Error::MalformedResponse {
					context: context.clone(),
					reason: "declared token lifetime must be positive".into(),
				}
			})?;
		let mut builder = TokenEntry::builder(context.clone())
			.access_token(grant.access_token)
			.owner_email(credentials.email.clone())
			.issued_at(issued_at)
			.expires_at(expires_at);

		if let Some(refresh) = grant.refresh_token {
			builder = builder.refresh_token(refresh);
		}

		builder.build().map_err(|err| Error::MalformedResponse {
			context: context.clone(),
			reason: err.to_string(),
		})
	}
}
impl Debug for LoginCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginCoordinator")
			.field("contexts", &self.resolver.contexts().collect::<Vec<_>>())
			.field("options", &self.options)
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::AtomicUsize;
	// self
	use super::*;
	use crate::{
		auth::CredentialRecord,
		gateway::{GatewayError, GatewayFuture, LoginGrant},
	};

	#[derive(Default)]
	struct CountingGateway {
		calls: AtomicUsize,
	}
	impl AuthGateway for CountingGateway {
		fn login<'a>(&'a self, _request: LoginRequest<'a>) -> GatewayFuture<'a, LoginGrant> {
			Box::pin(async move {
				let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

				tokio::time::sleep(std::time::Duration::from_millis(20)).await;

				if n == 1 {
					Err(GatewayError::Rejected { status: Some(401), reason: "HTTP 401".into() })
				} else {
					Ok(LoginGrant::new(format!("T-{n}")).with_expires_in(Duration::hours(1)))
				}
			})
		}
	}

	fn context() -> IdentityContext {
		IdentityContext::new("Tenant").expect("Context fixture should be valid.")
	}

	fn coordinator(gateway: Arc<CountingGateway>) -> LoginCoordinator {
		let resolver = ContextResolver::new()
			.with_record(context(), CredentialRecord::new("tenant@example.com", "pw"));

		LoginCoordinator::new(Arc::new(resolver), gateway, CacheOptions::default())
	}

	#[tokio::test]
	async fn joined_callers_share_a_failure_then_retry_fresh() {
		let gateway = Arc::new(CountingGateway::default());
		let coordinator = coordinator(gateway.clone());
		let ctx = context();
		let (first, second, third) =
			tokio::join!(coordinator.login(&ctx), coordinator.login(&ctx), coordinator.login(&ctx));

		for outcome in [first, second, third] {
			assert!(matches!(outcome, Err(Error::AuthenticationFailed { status: Some(401), .. })));
		}

		assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.metrics().joins(), 2);
		assert!(!coordinator.in_flight(&ctx));

		let entry = coordinator.login(&ctx).await.expect("Retry after a failure should succeed.");

		assert_eq!(entry.access_token.expose(), "T-2");
		assert_eq!(entry.owner_email, "tenant@example.com");
		assert_eq!(entry.expires_at - entry.issued_at, Duration::minutes(8));
		assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn unknown_context_never_reaches_the_gateway() {
		let gateway = Arc::new(CountingGateway::default());
		let coordinator = coordinator(gateway.clone());
		let unknown = IdentityContext::new("Ghost").expect("Context fixture should be valid.");
		let err = coordinator.login(&unknown).await.expect_err("Unknown contexts should fail.");

		assert!(matches!(err, Error::CredentialsNotConfigured { .. }));
		assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
		assert_eq!(coordinator.metrics().gateway_calls(), 0);
		assert_eq!(coordinator.metrics().failures(), 1);
		assert!(coordinator.flights.lock().is_empty());
		assert!(!coordinator.in_flight(&unknown));
	}
}
