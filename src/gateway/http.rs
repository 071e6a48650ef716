//! Reqwest-backed [`AuthGateway`] that posts JSON credentials to the login endpoint.

// crates.io
use reqwest::{
	header::{ACCEPT, CONTENT_TYPE, HeaderValue},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	gateway::{
		AuthGateway, GatewayDescriptor, GatewayError, GatewayFuture, LoginGrant, LoginRequest,
		response,
	},
};

const APPLICATION_JSON: &str = "application/json";

/// HTTP gateway over [`ReqwestClient`].
///
/// Login endpoints answer directly, so the default client does not follow redirects; configure
/// any custom client passed to [`ReqwestGateway::with_client`] the same way.
#[derive(Clone, Debug)]
pub struct ReqwestGateway {
	client: ReqwestClient,
	descriptor: GatewayDescriptor,
}
impl ReqwestGateway {
	/// Builds a gateway with its own client, honoring the descriptor's request timeout.
	pub fn new(descriptor: GatewayDescriptor) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.timeout(descriptor.request_timeout.unsigned_abs())
			.build()?;

		Ok(Self { client, descriptor })
	}

	/// Wraps an existing client.
	pub fn with_client(client: ReqwestClient, descriptor: GatewayDescriptor) -> Self {
		Self { client, descriptor }
	}

	/// Returns the descriptor this gateway posts to.
	pub fn descriptor(&self) -> &GatewayDescriptor {
		&self.descriptor
	}

	async fn post_login(&self, request: LoginRequest<'_>) -> Result<LoginGrant, GatewayError> {
		let reply = self
			.client
			.post(self.descriptor.login_endpoint.clone())
			.header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
			.header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON))
			.body(request.json_body())
			.send()
			.await
			.map_err(map_transport_error)?;
		let status = reply.status();
		let body = reply.bytes().await.map_err(map_transport_error)?;

		if !status.is_success() {
			return Err(response::rejection(status.as_u16(), &body));
		}

		response::decode_login_response(&body)
	}
}
impl AuthGateway for ReqwestGateway {
	fn login<'a>(&'a self, request: LoginRequest<'a>) -> GatewayFuture<'a, LoginGrant> {
		Box::pin(self.post_login(request))
	}
}

fn map_transport_error(err: ReqwestError) -> GatewayError {
	if err.is_timeout() { GatewayError::TimedOut } else { GatewayError::unreachable(err) }
}
