//! Authentication gateway contract: the one remote operation the cache depends on.
//!
//! The cache never talks HTTP directly. It hands a [`LoginRequest`] to an [`AuthGateway`] and
//! expects a [`LoginGrant`] (access token, optional refresh token, optional declared lifetime) or
//! a [`GatewayError`]. [`ReqwestGateway`] is the default transport; tests and custom stacks plug
//! in their own implementation.

pub mod descriptor;
#[cfg(feature = "reqwest")] pub mod http;
pub mod response;

pub use descriptor::*;
#[cfg(feature = "reqwest")] pub use http::ReqwestGateway;
pub use response::*;

// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, IdentityContext, TokenSecret},
	error::SharedError,
};

/// Boxed future returned by [`AuthGateway::login`].
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + 'a + Send>>;

/// Remote login endpoint.
///
/// Implementations must be safe to share across workers. The coordinator guarantees that at most
/// one call per identity context is outstanding at any time, and bounds every call with its own
/// timeout, so implementations do not need to deduplicate or time out on their own.
pub trait AuthGateway
where
	Self: Send + Sync,
{
	/// Exchanges credentials for a token.
	fn login<'a>(&'a self, request: LoginRequest<'a>) -> GatewayFuture<'a, LoginGrant>;
}

/// Login attempt for one identity context.
#[derive(Clone, Copy, Debug)]
pub struct LoginRequest<'a> {
	/// Context the login is performed for.
	pub context: &'a IdentityContext,
	/// Resolved credentials for the context.
	pub credentials: &'a CredentialRecord,
}
impl LoginRequest<'_> {
	/// Renders the JSON body sent to the login endpoint.
	///
	/// Hints are merged into the top-level object; `email` and `password` always win over a hint
	/// of the same name.
	pub fn json_body(&self) -> Vec<u8> {
		let mut body = serde_json::Map::new();

		for (key, value) in &self.credentials.hints {
			body.insert(key.clone(), value.clone().into());
		}

		body.insert("email".into(), self.credentials.email.clone().into());
		body.insert("password".into(), self.credentials.password.expose().into());

		serde_json::Value::Object(body).to_string().into_bytes()
	}
}

/// Successful login payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginGrant {
	/// Bearer token.
	pub access_token: TokenSecret,
	/// Refresh token, if issued.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime declared by the gateway, if any.
	pub expires_in: Option<Duration>,
}
impl LoginGrant {
	/// Creates a grant with only an access token.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self { access_token: access_token.into(), refresh_token: None, expires_in: None }
	}

	/// Sets the declared lifetime.
	pub fn with_expires_in(mut self, lifetime: Duration) -> Self {
		self.expires_in = Some(lifetime);

		self
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}
}

/// Failures reported by a gateway, before the coordinator attaches the identity context.
#[derive(Clone, Debug, ThisError)]
pub enum GatewayError {
	/// Gateway rejected the credentials or returned a non-success status.
	#[error("Login was rejected: {reason}.")]
	Rejected {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Short reason, typically a body preview.
		reason: String,
	},
	/// Success status with a payload that cannot be used.
	#[error("Login response is malformed: {reason}.")]
	Malformed {
		/// Decoding failure summary.
		reason: String,
	},
	/// Transport-level timeout reported by the gateway itself.
	#[error("Login request timed out.")]
	TimedOut,
	/// Network failure (DNS, TCP, TLS).
	#[error("Authentication gateway is unreachable.")]
	Unreachable {
		/// Transport-specific failure.
		#[source]
		source: SharedError,
	},
}
impl GatewayError {
	/// Wraps a transport-specific network error.
	pub fn unreachable(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Unreachable { source: Arc::new(src) }
	}

	/// Attaches the identity context, producing the public error, given the coordinator's bound.
	pub(crate) fn into_error(self, context: &IdentityContext, timeout: Duration) -> Error {
		let context = context.clone();

		match self {
			Self::Rejected { status, reason } =>
				Error::AuthenticationFailed { context, status, reason },
			Self::Malformed { reason } => Error::MalformedResponse { context, reason },
			Self::TimedOut => Error::GatewayTimeout { context, timeout },
			Self::Unreachable { source } => Error::GatewayUnreachable { context, source },
		}
	}
}
