//! Login credentials resolved once per identity context.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Email/password pair (plus optional login hints) for one identity context.
///
/// Records are immutable once resolved; the password is wrapped in [`TokenSecret`] so it never
/// leaks through `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
	/// Login identifier; also recorded as the owner of issued tokens.
	pub email: String,
	/// Login secret.
	pub password: TokenSecret,
	/// Extra login body fields such as a portal or tenant discriminator.
	pub hints: BTreeMap<String, String>,
}
impl CredentialRecord {
	/// Creates a record without hints.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: TokenSecret::new(password), hints: BTreeMap::new() }
	}

	/// Adds or replaces a login hint.
	pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.hints.insert(key.into(), value.into());

		self
	}
}
impl Debug for CredentialRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialRecord")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.field("hints", &self.hints)
			.finish()
	}
}
