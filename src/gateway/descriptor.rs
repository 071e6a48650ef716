//! Gateway descriptor: where the login endpoint lives and how long a request may take.

// crates.io
use url::Host;
// self
use crate::{_prelude::*, error::ConfigError};

/// Validated login endpoint configuration consumed by HTTP gateways.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayDescriptor {
	/// Endpoint that accepts the JSON login `POST`.
	pub login_endpoint: Url,
	/// Per-request transport timeout.
	pub request_timeout: Duration,
}
impl GatewayDescriptor {
	/// Transport timeout used unless overridden.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates a new builder.
	pub fn builder() -> GatewayDescriptorBuilder {
		GatewayDescriptorBuilder::default()
	}
}

/// Builder for [`GatewayDescriptor`] values.
#[derive(Debug, Default)]
pub struct GatewayDescriptorBuilder {
	login_endpoint: Option<Result<Url, url::ParseError>>,
	request_timeout: Option<Duration>,
}
impl GatewayDescriptorBuilder {
	/// Sets the login endpoint.
	pub fn login_endpoint(mut self, url: Url) -> Self {
		self.login_endpoint = Some(Ok(url));

		self
	}

	/// Parses and sets the login endpoint; parse failures surface from [`build`](Self::build).
	pub fn login_endpoint_str(mut self, url: &str) -> Self {
		self.login_endpoint = Some(Url::parse(url));

		self
	}

	/// Overrides the per-request transport timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<GatewayDescriptor, ConfigError> {
		let login_endpoint = self
			.login_endpoint
			.ok_or(ConfigError::MissingLoginEndpoint)?
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let request_timeout =
			self.request_timeout.unwrap_or(GatewayDescriptor::DEFAULT_REQUEST_TIMEOUT);

		validate_endpoint(&login_endpoint)?;

		if !request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveDuration { setting: "request timeout" });
		}

		Ok(GatewayDescriptor { login_endpoint, request_timeout })
	}
}

fn validate_endpoint(url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureEndpoint { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(addr)) => addr.is_loopback(),
		Some(Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}
