#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::Duration;
// self
use credential_cache::{
	CacheOptions, ConfigError, CredentialCache, Error,
	auth::{CredentialRecord, IdentityContext},
	gateway::GatewayDescriptor,
	resolver::ContextResolver,
};

fn tenant() -> IdentityContext {
	IdentityContext::new("TenantAdmin").expect("Context fixture should be valid.")
}

fn build_cache(server: &MockServer) -> CredentialCache {
	let descriptor = GatewayDescriptor::builder()
		.login_endpoint_str(&server.url("/api/auth/login"))
		.request_timeout(Duration::seconds(5))
		.build()
		.expect("Loopback HTTP endpoints should be accepted.");
	let resolver = ContextResolver::new().with_record(
		tenant(),
		CredentialRecord::new("tenant@example.com", "hunter2").with_hint("portal", "tenant"),
	);

	CredentialCache::from_descriptor(resolver, descriptor, CacheOptions::default())
		.expect("Reqwest gateway should build.")
}

#[tokio::test]
async fn login_posts_credentials_and_hints_then_caches_the_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/login")
				.header("content-type", "application/json")
				.json_body(json!({
					"email": "tenant@example.com",
					"password": "hunter2",
					"portal": "tenant",
				}));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"T-1\",\"refreshToken\":\"R-1\",\"expiresInSeconds\":480}");
		})
		.await;
	let cache = build_cache(&server);
	let entry = cache.get_entry(&tenant()).await.expect("Login should succeed.");

	assert_eq!(entry.access_token.expose(), "T-1");
	assert_eq!(entry.refresh_token.as_ref().map(|token| token.expose()), Some("R-1"));
	assert_eq!(entry.expires_at - entry.issued_at, Duration::minutes(8));
	assert_eq!(
		cache.authorization_header(&tenant()).await.expect("Cached token should be served."),
		"Bearer T-1"
	);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn non_success_status_maps_to_authentication_failed() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"invalid credentials\"}");
		})
		.await;
	let cache = build_cache(&server);
	let err = cache.get_token(&tenant()).await.expect_err("A 401 should fail the login.");

	match &err {
		Error::AuthenticationFailed { context, status, reason } => {
			assert_eq!(context, &tenant());
			assert_eq!(*status, Some(401));
			assert!(reason.contains("invalid credentials"));
		},
		other => panic!("Expected an authentication failure, got {other:?}."),
	}

	assert!(!err.is_transport());
	assert!(cache.peek(&tenant()).is_none());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_success_body_maps_to_malformed_response() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"expiresIn\":\"soon\"}");
		})
		.await;
	let cache = build_cache(&server);
	let err = cache.get_token(&tenant()).await.expect_err("An unusable body should fail.");

	assert!(matches!(err, Error::MalformedResponse { ref context, .. } if *context == tenant()));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_gateway_is_a_transport_error() {
	let descriptor = GatewayDescriptor::builder()
		.login_endpoint_str("http://127.0.0.1:1/api/auth/login")
		.request_timeout(Duration::seconds(2))
		.build()
		.expect("Loopback HTTP endpoints should be accepted.");
	let resolver = ContextResolver::new()
		.with_record(tenant(), CredentialRecord::new("tenant@example.com", "hunter2"));
	let cache = CredentialCache::from_descriptor(resolver, descriptor, CacheOptions::default())
		.expect("Reqwest gateway should build.");
	let err = cache.get_token(&tenant()).await.expect_err("A closed port should fail.");

	assert!(err.is_transport());
	assert_eq!(err.context(), Some(&tenant()));
}

#[test]
fn descriptor_rejects_plain_http_for_remote_hosts() {
	let err = GatewayDescriptor::builder()
		.login_endpoint_str("http://auth.example.com/login")
		.build()
		.expect_err("Remote plain HTTP endpoints should be rejected.");

	assert!(matches!(err, ConfigError::InsecureEndpoint { .. }));
}
