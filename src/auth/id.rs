//! Strongly typed identity context names.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Symbolic name of a logical actor (`SuperAdmin`, `TenantAdmin`, ...) whose token lifecycle is
/// tracked independently from every other actor.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityContext(String);
impl IdentityContext {
	/// Creates a new context after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the context name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for IdentityContext {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for IdentityContext {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<IdentityContext> for String {
	fn from(value: IdentityContext) -> Self {
		value.0
	}
}
impl TryFrom<String> for IdentityContext {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for IdentityContext {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for IdentityContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "IdentityContext({})", self.0)
	}
}
impl Display for IdentityContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for IdentityContext {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Error returned when identity context validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The name was empty.
	#[error("Identity context name cannot be empty.")]
	Empty,
	/// The name contains whitespace characters.
	#[error("Identity context name contains whitespace.")]
	ContainsWhitespace,
	/// The name exceeded the allowed character count.
	#[error("Identity context name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
