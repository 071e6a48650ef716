//! Cache-level error types shared across the resolver, coordinator, and gateways.

// self
use crate::{_prelude::*, auth::IdentityContext};

/// Cache-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shared, clonable handle to an underlying error source.
///
/// Login outcomes are delivered to every caller joined to the same flight, so sources are
/// reference-counted instead of boxed.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant raised while obtaining a token names the identity context it belongs to, so a
/// failure for one actor can never be mistaken for another's.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// No credential source entry exists for the requested context.
	#[error("No credentials are configured for identity context `{context}`.")]
	CredentialsNotConfigured {
		/// Context that was requested.
		context: IdentityContext,
	},
	/// Gateway rejected the credentials or answered with a non-success status.
	#[error("Authentication failed for identity context `{context}`: {reason}.")]
	AuthenticationFailed {
		/// Context whose login failed.
		context: IdentityContext,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Gateway- or cache-supplied reason string.
		reason: String,
	},
	/// Gateway answered successfully but the payload could not be used.
	#[error("Login response for identity context `{context}` is malformed: {reason}.")]
	MalformedResponse {
		/// Context whose login failed.
		context: IdentityContext,
		/// Decoding or validation failure summary.
		reason: String,
	},
	/// Login did not settle within the configured bound.
	#[error("Login for identity context `{context}` timed out after {timeout}.")]
	GatewayTimeout {
		/// Context whose login timed out.
		context: IdentityContext,
		/// Bound that was exceeded.
		timeout: Duration,
	},
	/// Gateway could not be reached (DNS, TCP, TLS).
	#[error("Authentication gateway is unreachable for identity context `{context}`.")]
	GatewayUnreachable {
		/// Context whose login failed.
		context: IdentityContext,
		/// Transport-specific failure.
		#[source]
		source: SharedError,
	},
}
impl Error {
	/// Returns the identity context the error belongs to, if any.
	pub fn context(&self) -> Option<&IdentityContext> {
		match self {
			Self::Config(_) => None,
			Self::CredentialsNotConfigured { context }
			| Self::AuthenticationFailed { context, .. }
			| Self::MalformedResponse { context, .. }
			| Self::GatewayTimeout { context, .. }
			| Self::GatewayUnreachable { context, .. } => Some(context),
		}
	}

	/// Returns `true` for transport-level failures (timeouts and unreachable gateways).
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::GatewayTimeout { .. } | Self::GatewayUnreachable { .. })
	}
}

/// Configuration and validation failures raised while assembling the cache.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed: {message}.")]
	HttpClientBuild {
		/// Underlying builder failure, rendered.
		message: String,
	},
	/// Login endpoint is missing from the gateway descriptor.
	#[error("Missing login endpoint.")]
	MissingLoginEndpoint,
	/// Login endpoint cannot be parsed.
	#[error("Login endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Login endpoint must use HTTPS unless it points at a loopback host.
	#[error("The login endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// A duration setting must be strictly positive.
	#[error("The {setting} must be positive.")]
	NonPositiveDuration {
		/// Name of the offending setting.
		setting: &'static str,
	},
	/// An identity context name failed validation.
	#[error(transparent)]
	InvalidContext(#[from] crate::auth::IdentifierError),
	/// A credential record is missing a required field.
	#[error("Credentials for identity context `{context}` are missing the {field}.")]
	IncompleteCredentials {
		/// Context whose record is incomplete.
		context: String,
		/// Missing field name.
		field: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl Display) -> Self {
		Self::HttpClientBuild { message: src.to_string() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
