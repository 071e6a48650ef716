//! Expiry policy applied to every successful login.

// self
use crate::{_prelude::*, error::ConfigError};

/// Computes the effective expiry of freshly issued tokens.
///
/// `expires_at = issued_at + min(declared_lifetime, safety_horizon)`. A gateway that declares no
/// lifetime is assumed to issue short-lived tokens and gets the full horizon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryPolicy {
	safety_horizon: Duration,
}
impl ExpiryPolicy {
	/// Horizon used unless overridden.
	pub const DEFAULT_SAFETY_HORIZON: Duration = Duration::minutes(8);

	/// Creates a policy with the provided horizon.
	pub fn with_safety_horizon(horizon: Duration) -> Result<Self, ConfigError> {
		if !horizon.is_positive() {
			return Err(ConfigError::NonPositiveDuration { setting: "safety horizon" });
		}

		Ok(Self { safety_horizon: horizon })
	}

	/// Returns the configured horizon.
	pub fn safety_horizon(&self) -> Duration {
		self.safety_horizon
	}

	/// Returns the lifetime granted to a token whose gateway declared `declared`.
	///
	/// Returns `None` when the declared lifetime is zero or negative, which callers treat as a
	/// malformed login response.
	pub fn effective_lifetime(&self, declared: Option<Duration>) -> Option<Duration> {
		match declared {
			None => Some(self.safety_horizon),
			Some(lifetime) if lifetime.is_positive() => Some(lifetime.min(self.safety_horizon)),
			Some(_) => None,
		}
	}

	/// Returns the effective expiry instant for a token issued at `issued_at`.
	pub fn expires_at(
		&self,
		issued_at: OffsetDateTime,
		declared: Option<Duration>,
	) -> Option<OffsetDateTime> {
		self.effective_lifetime(declared).map(|lifetime| issued_at + lifetime)
	}
}
impl Default for ExpiryPolicy {
	fn default() -> Self {
		Self { safety_horizon: Self::DEFAULT_SAFETY_HORIZON }
	}
}
