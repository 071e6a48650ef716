//! Context resolver: the static lookup table from identity context to credentials.
//!
//! Records come either from explicit registration ([`ContextResolver::with_record`]) or from
//! environment-style key/value pairs:
//!
//! - `<PREFIX><CONTEXT>_EMAIL`
//! - `<PREFIX><CONTEXT>_PASSWORD`
//! - `<PREFIX><CONTEXT>_HINT_<NAME>` (optional, `NAME` is lowercased)
//!
//! The context name is taken verbatim from the key, so `E2E_SuperAdmin_EMAIL` with prefix `E2E_`
//! configures the `SuperAdmin` context.

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, IdentityContext, TokenSecret},
	error::ConfigError,
};

const EMAIL_SUFFIX: &str = "_EMAIL";
const PASSWORD_SUFFIX: &str = "_PASSWORD";
const HINT_MARKER: &str = "_HINT_";

/// Process-wide table mapping identity contexts to their credentials.
#[derive(Clone, Debug, Default)]
pub struct ContextResolver {
	records: BTreeMap<IdentityContext, CredentialRecord>,
}
impl ContextResolver {
	/// Creates an empty resolver.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers (or replaces) the record for a context.
	pub fn with_record(mut self, context: IdentityContext, record: CredentialRecord) -> Self {
		self.records.insert(context, record);

		self
	}

	/// Builds a resolver from the current process environment.
	pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
		Self::from_vars(prefix, std::env::vars())
	}

	/// Builds a resolver from environment-style key/value pairs.
	///
	/// Keys that do not start with `prefix` or do not match one of the recognized suffixes are
	/// ignored. A context with only one of email/password configured is rejected.
	pub fn from_vars<I, K, V>(prefix: &str, vars: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		#[derive(Default)]
		struct Partial {
			email: Option<String>,
			password: Option<String>,
			hints: BTreeMap<String, String>,
		}

		let mut partials = BTreeMap::<String, Partial>::new();

		for (key, value) in vars {
			let Some(rest) = key.as_ref().strip_prefix(prefix) else {
				continue;
			};

			if let Some(name) = rest.strip_suffix(EMAIL_SUFFIX) {
				partials.entry(name.to_owned()).or_default().email = Some(value.into());
			} else if let Some(name) = rest.strip_suffix(PASSWORD_SUFFIX) {
				partials.entry(name.to_owned()).or_default().password = Some(value.into());
			} else if let Some((name, hint)) = rest.split_once(HINT_MARKER) {
				if hint.is_empty() {
					continue;
				}

				partials
					.entry(name.to_owned())
					.or_default()
					.hints
					.insert(hint.to_ascii_lowercase(), value.into());
			}
		}

		let mut resolver = Self::new();

		for (name, partial) in partials {
			let context = IdentityContext::new(&name)?;
			let email = partial
				.email
				.filter(|email| !email.is_empty())
				.ok_or(ConfigError::IncompleteCredentials { context: name.clone(), field: "email" })?;
			let password = partial
				.password
				.ok_or(ConfigError::IncompleteCredentials { context: name, field: "password" })?;
			let record = CredentialRecord {
				email,
				password: TokenSecret::new(password),
				hints: partial.hints,
			};

			resolver.records.insert(context, record);
		}

		Ok(resolver)
	}

	/// Resolves the credentials for a context.
	pub fn resolve(&self, context: &IdentityContext) -> Result<CredentialRecord> {
		self.records
			.get(context)
			.cloned()
			.ok_or_else(|| Error::CredentialsNotConfigured { context: context.clone() })
	}

	/// Returns `true` when the context has a record.
	pub fn contains(&self, context: &IdentityContext) -> bool {
		self.records.contains_key(context)
	}

	/// Iterates over the configured contexts in name order.
	pub fn contexts(&self) -> impl Iterator<Item = &IdentityContext> {
		self.records.keys()
	}
}
