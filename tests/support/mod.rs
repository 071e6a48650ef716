#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
use tokio::sync::Notify;
// self
use credential_cache::{
	CacheOptions, CredentialCache,
	auth::{CredentialRecord, IdentityContext},
	gateway::{AuthGateway, GatewayError, GatewayFuture, LoginGrant, LoginRequest},
	resolver::ContextResolver,
};

/// Lifetime the stub declares for every token, mirroring the production login endpoint.
pub const DECLARED_LIFETIME: Duration = Duration::seconds(480);

/// In-memory gateway whose behavior is scripted per identity context.
///
/// Successful logins return `T-<n>` where `n` counts calls for that context.
#[derive(Default)]
pub struct StubGateway {
	calls: Mutex<HashMap<String, usize>>,
	emails: Mutex<Vec<String>>,
	rejections: Mutex<HashMap<String, usize>>,
	hang_first: Mutex<HashSet<String>>,
	hang_always: HashSet<String>,
	gate: Option<Arc<Notify>>,
	delay: Option<std::time::Duration>,
}
impl StubGateway {
	pub fn new() -> Self {
		Self::default()
	}

	/// Delays every call so concurrent callers pile up on the flight.
	pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	/// Rejects the next `times` calls for `context` with a 401.
	pub fn reject(self, context: &str, times: usize) -> Self {
		self.rejections.lock().insert(context.into(), times);

		self
	}

	/// Never settles calls for `context`.
	pub fn hang(mut self, context: &str) -> Self {
		self.hang_always.insert(context.into());

		self
	}

	/// Never settles the first call for `context`; later calls behave normally.
	pub fn hang_once(self, context: &str) -> Self {
		self.hang_first.lock().insert(context.into());

		self
	}

	/// Holds every call until the returned handle is notified once per call.
	pub fn gated(mut self) -> (Self, Arc<Notify>) {
		let gate = Arc::new(Notify::new());

		self.gate = Some(gate.clone());

		(self, gate)
	}

	pub fn calls(&self, context: &str) -> usize {
		self.calls.lock().get(context).copied().unwrap_or_default()
	}

	pub fn total_calls(&self) -> usize {
		self.calls.lock().values().sum()
	}

	pub fn emails(&self) -> Vec<String> {
		self.emails.lock().clone()
	}
}
impl AuthGateway for StubGateway {
	fn login<'a>(&'a self, request: LoginRequest<'a>) -> GatewayFuture<'a, LoginGrant> {
		let context = request.context.as_str().to_owned();
		let n = {
			let mut calls = self.calls.lock();
			let n = calls.entry(context.clone()).or_default();

			*n += 1;

			*n
		};

		self.emails.lock().push(request.credentials.email.clone());

		let hang = self.hang_always.contains(&context) || self.hang_first.lock().remove(&context);
		let reject = match self.rejections.lock().get_mut(&context) {
			Some(remaining) if *remaining > 0 => {
				*remaining -= 1;

				true
			},
			_ => false,
		};

		Box::pin(async move {
			if hang {
				std::future::pending::<()>().await;
			}
			if let Some(gate) = &self.gate {
				gate.notified().await;
			}
			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}
			if reject {
				return Err(GatewayError::Rejected {
					status: Some(401),
					reason: "HTTP 401: invalid credentials".into(),
				});
			}

			Ok(LoginGrant::new(format!("T-{n}")).with_expires_in(DECLARED_LIFETIME))
		})
	}
}

pub fn ctx(name: &str) -> IdentityContext {
	IdentityContext::new(name).expect("Context fixture should be valid.")
}

/// Resolver with credentials for every listed context (`<name>@example.com`).
pub fn resolver(names: &[&str]) -> ContextResolver {
	names.iter().fold(ContextResolver::new(), |resolver, name| {
		resolver.with_record(
			ctx(name),
			CredentialRecord::new(format!("{}@example.com", name.to_lowercase()), "pw"),
		)
	})
}

pub fn build_cache(
	names: &[&str],
	gateway: StubGateway,
	options: CacheOptions,
) -> (CredentialCache, Arc<StubGateway>) {
	let gateway = Arc::new(gateway);
	let cache = CredentialCache::with_options(resolver(names), gateway.clone(), options);

	(cache, gateway)
}

/// Waits until a login for `context` is holding its flight.
pub async fn wait_in_flight(cache: &CredentialCache, context: &IdentityContext) {
	for _ in 0..200 {
		if cache.coordinator().in_flight(context) {
			return;
		}

		tokio::time::sleep(std::time::Duration::from_millis(5)).await;
	}

	panic!("Login for `{context}` never started.");
}
