//! Process-wide token cache keyed by identity context.
//!
//! [`CredentialCache`] answers "give me a usable token for context `C`". A valid entry is served
//! without suspending; anything else goes through the [`LoginCoordinator`] so concurrent callers
//! share one gateway login per context. The cache is an explicitly constructed, cheaply clonable
//! handle: build it once at process start, hand clones to workers, and call
//! [`CredentialCache::clear`] (or [`CredentialCache::shutdown`]) at teardown.

// self
use crate::{
	_prelude::*,
	auth::{IdentityContext, TokenEntry, TokenSecret},
	coordinator::{LoginCoordinator, LoginMetrics},
	error::ConfigError,
	gateway::AuthGateway,
	obs::{self, LoginSpan, LookupOutcome},
	policy::ExpiryPolicy,
	resolver::ContextResolver,
};
#[cfg(feature = "reqwest")]
use crate::gateway::{GatewayDescriptor, ReqwestGateway};

/// Tunables shared by the cache and its coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheOptions {
	policy: ExpiryPolicy,
	login_timeout: Duration,
}
impl CacheOptions {
	/// Bound applied to every gateway login unless overridden.
	pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::seconds(30);

	/// Overrides the expiry policy.
	pub fn with_policy(mut self, policy: ExpiryPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Overrides the safety horizon of the expiry policy.
	pub fn with_safety_horizon(self, horizon: Duration) -> Result<Self, ConfigError> {
		Ok(self.with_policy(ExpiryPolicy::with_safety_horizon(horizon)?))
	}

	/// Overrides the bound applied to every gateway login.
	///
	/// The bound is enforced with `tokio::time::timeout` and needs a Tokio runtime with the time
	/// driver enabled.
	pub fn with_login_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
		if !timeout.is_positive() {
			return Err(ConfigError::NonPositiveDuration { setting: "login timeout" });
		}

		self.login_timeout = timeout;

		Ok(self)
	}

	/// Expiry policy applied to fresh tokens.
	pub fn policy(&self) -> ExpiryPolicy {
		self.policy
	}

	/// Bound applied to every gateway login.
	pub fn login_timeout(&self) -> Duration {
		self.login_timeout
	}
}
impl Default for CacheOptions {
	fn default() -> Self {
		Self { policy: ExpiryPolicy::default(), login_timeout: Self::DEFAULT_LOGIN_TIMEOUT }
	}
}

#[derive(Debug, Default)]
struct Slot {
	entry: Option<TokenEntry>,
	epoch: u64,
}

#[derive(Debug)]
struct CacheInner {
	coordinator: LoginCoordinator,
	metrics: Arc<LoginMetrics>,
	slots: Mutex<HashMap<IdentityContext, Slot>>,
}

/// Shared, concurrency-safe token cache for a fixed set of identity contexts.
///
/// Lookups that miss run a login bounded by `tokio::time::timeout`; await them inside a Tokio
/// runtime with the time driver enabled (`#[tokio::main]` and `#[tokio::test]` both qualify).
/// Lookups served from a valid entry never touch the runtime.
#[derive(Clone, Debug)]
pub struct CredentialCache {
	inner: Arc<CacheInner>,
}
impl CredentialCache {
	/// Creates a cache over the provided resolver and gateway with default options.
	pub fn new(resolver: ContextResolver, gateway: Arc<dyn AuthGateway>) -> Self {
		Self::with_options(resolver, gateway, CacheOptions::default())
	}

	/// Creates a cache with explicit options.
	pub fn with_options(
		resolver: ContextResolver,
		gateway: Arc<dyn AuthGateway>,
		options: CacheOptions,
	) -> Self {
		let metrics = Arc::new(LoginMetrics::default());
		let coordinator = LoginCoordinator::new(Arc::new(resolver), gateway, options)
			.with_metrics(metrics.clone());

		Self { inner: Arc::new(CacheInner { coordinator, metrics, slots: Default::default() }) }
	}

	#[cfg(feature = "reqwest")]
	/// Creates a cache backed by the crate's reqwest gateway.
	pub fn from_descriptor(
		resolver: ContextResolver,
		descriptor: GatewayDescriptor,
		options: CacheOptions,
	) -> Result<Self> {
		let gateway = ReqwestGateway::new(descriptor)?;

		Ok(Self::with_options(resolver, Arc::new(gateway), options))
	}

	/// Returns a usable access token for `context`, logging in (or joining a login) if needed.
	pub async fn get_token(&self, context: &IdentityContext) -> Result<TokenSecret> {
		self.get_entry(context).await.map(|entry| entry.access_token)
	}

	/// Returns a usable entry for `context`, logging in (or joining a login) if needed.
	///
	/// On failure nothing is stored, the error names `context`, and the next call is free to try
	/// again.
	pub async fn get_entry(&self, context: &IdentityContext) -> Result<TokenEntry> {
		self.inner.metrics.record_lookup();

		if let Some(entry) = self.fresh_entry(context) {
			self.inner.metrics.record_hit();
			obs::record_lookup(context, LookupOutcome::Hit);

			return Ok(entry);
		}

		obs::record_lookup(context, LookupOutcome::Miss);

		let epoch = self.epoch(context);
		let span = LoginSpan::new(context, "get_token");

		span.instrument(self.inner.coordinator.login_with(
			context,
			|| self.fresh_entry(context),
			|entry| self.store_if_current(context, epoch, entry),
		))
		.await
	}

	/// Returns `Bearer <token>` for `context`.
	pub async fn authorization_header(&self, context: &IdentityContext) -> Result<String> {
		let token = self.get_token(context).await?;

		Ok(format!("Bearer {}", token.expose()))
	}

	/// Returns the stored entry for `context` if it is still valid; never logs in.
	pub fn peek(&self, context: &IdentityContext) -> Option<TokenEntry> {
		self.fresh_entry(context)
	}

	/// Ensures every listed context holds a valid token, in order, stopping at the first failure.
	pub async fn prime<'a, I>(&self, contexts: I) -> Result<()>
	where
		I: IntoIterator<Item = &'a IdentityContext>,
	{
		for context in contexts {
			self.get_entry(context).await?;
		}

		Ok(())
	}

	/// Drops the stored entry for `context` so the next lookup logs in again.
	///
	/// A login already in flight for `context` is left alone; its result is not stored, but new
	/// callers still join it rather than start a second concurrent login. No-op for contexts
	/// without an entry.
	pub fn invalidate(&self, context: &IdentityContext) {
		if let Some(slot) = self.inner.slots.lock().get_mut(context) {
			slot.entry = None;
			slot.epoch += 1;
		}
	}

	/// Drops every stored entry and forgets every in-flight login.
	///
	/// Callers already waiting on a login still receive its outcome, but the result is never
	/// stored.
	pub fn clear(&self) {
		{
			let mut slots = self.inner.slots.lock();

			for slot in slots.values_mut() {
				slot.entry = None;
				slot.epoch += 1;
			}
		}

		self.inner.coordinator.abandon_all();
	}

	/// Clears the cache and releases this handle.
	pub fn shutdown(self) {
		self.clear();
	}

	/// Counters for lookups and logins performed through this cache.
	pub fn metrics(&self) -> &LoginMetrics {
		&self.inner.metrics
	}

	/// Coordinator driving logins for this cache.
	pub fn coordinator(&self) -> &LoginCoordinator {
		&self.inner.coordinator
	}

	fn fresh_entry(&self, context: &IdentityContext) -> Option<TokenEntry> {
		let now = OffsetDateTime::now_utc();

		self.inner
			.slots
			.lock()
			.get(context)
			.and_then(|slot| slot.entry.as_ref())
			.filter(|entry| entry.is_valid_at(now))
			.cloned()
	}

	// Unconfigured contexts never get a slot; their lookups fail before anything is stored.
	fn epoch(&self, context: &IdentityContext) -> u64 {
		let mut slots = self.inner.slots.lock();

		if let Some(slot) = slots.get(context) {
			return slot.epoch;
		}
		if !self.inner.coordinator.resolver().contains(context) {
			return 0;
		}

		slots.entry(context.clone()).or_default().epoch
	}

	fn store_if_current(&self, context: &IdentityContext, epoch: u64, entry: &TokenEntry) {
		let mut slots = self.inner.slots.lock();
		let slot = slots.entry(context.clone()).or_default();

		if slot.epoch == epoch {
			slot.entry = Some(entry.clone());

			obs::log_token_stored(context, entry.expires_at - entry.issued_at);
		}
	}

	#[cfg(test)]
	fn insert_entry(&self, entry: TokenEntry) {
		let context = entry.context.clone();

		self.inner.slots.lock().entry(context).or_default().entry = Some(entry);
	}
}
