//! Immutable cached token entries, lifecycle helpers, and builders.

// self
use crate::{
	_prelude::*,
	auth::{IdentityContext, token::secret::TokenSecret},
};

/// Current lifecycle status for a token entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Entry may be served from the cache.
	Valid,
	/// Entry reached its effective expiry and must be replaced.
	Expired,
}

/// Errors produced by [`TokenEntryBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenEntryBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when no owner email was recorded.
	#[error("Owner email is required.")]
	MissingOwner,
}

/// Token issued for one identity context.
///
/// Entries are replaced wholesale on every successful login and never mutated in place.
/// `expires_at` is the *effective* expiry computed by [`ExpiryPolicy`](crate::policy::ExpiryPolicy),
/// which may be well before the lifetime the gateway declared.
#[derive(Serialize, Deserialize, Clone)]
pub struct TokenEntry {
	/// Context the token was issued for.
	pub context: IdentityContext,
	/// Bearer token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token, if the gateway issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the login settled.
	pub issued_at: OffsetDateTime,
	/// Effective expiry instant.
	pub expires_at: OffsetDateTime,
	/// Email of the credential that obtained the token.
	pub owner_email: String,
}
impl TokenEntry {
	/// Returns a builder for the provided context.
	pub fn builder(context: IdentityContext) -> TokenEntryBuilder {
		TokenEntryBuilder::new(context)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.expires_at { TokenStatus::Valid } else { TokenStatus::Expired }
	}

	/// Returns `true` if the entry may be served at the provided instant.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Valid)
	}

	/// Returns `true` if the entry may be served right now.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Time left before the entry expires, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for TokenEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEntry")
			.field("context", &self.context)
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("owner_email", &self.owner_email)
			.finish()
	}
}

/// Builder for [`TokenEntry`].
#[derive(Clone, Debug)]
pub struct TokenEntryBuilder {
	context: IdentityContext,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
	owner_email: Option<String>,
}
impl TokenEntryBuilder {
	fn new(context: IdentityContext) -> Self {
		Self {
			context,
			access_token: None,
			refresh_token: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
			owner_email: None,
		}
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Records which credential obtained the token.
	pub fn owner_email(mut self, email: impl Into<String>) -> Self {
		self.owner_email = Some(email.into());

		self
	}

	/// Consumes the builder and produces a [`TokenEntry`].
	pub fn build(self) -> Result<TokenEntry, TokenEntryBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(TokenEntryBuilderError::MissingAccessToken)?;
		let owner_email = self.owner_email.ok_or(TokenEntryBuilderError::MissingOwner)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenEntryBuilderError::MissingExpiry),
		};

		Ok(TokenEntry {
			context: self.context,
			access_token,
			refresh_token: self.refresh_token,
			issued_at,
			expires_at,
			owner_email,
		})
	}
}
