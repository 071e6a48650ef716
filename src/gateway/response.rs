//! Login response decoding shared by every HTTP-shaped gateway.

// self
use crate::{
	_prelude::*,
	gateway::{GatewayError, LoginGrant},
};

const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Deserialize)]
struct LoginResponse {
	#[serde(alias = "accessToken", alias = "access_token")]
	token: String,
	#[serde(default, alias = "refreshToken")]
	refresh_token: Option<String>,
	#[serde(default, alias = "expiresIn", alias = "expiresInSeconds")]
	expires_in: Option<i64>,
}

/// Decodes a successful login body into a [`LoginGrant`].
///
/// Accepts `accessToken`/`access_token`/`token`, `refreshToken`/`refresh_token`, and
/// `expiresIn`/`expires_in`/`expiresInSeconds` (seconds). Errors carry the JSON path of the
/// offending field.
pub fn decode_login_response(body: &[u8]) -> Result<LoginGrant, GatewayError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let response: LoginResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|err| GatewayError::Malformed { reason: err.to_string() })?;

	if response.token.is_empty() {
		return Err(GatewayError::Malformed { reason: "access token is empty".into() });
	}

	Ok(LoginGrant {
		access_token: response.token.into(),
		refresh_token: response.refresh_token.filter(|token| !token.is_empty()).map(Into::into),
		expires_in: response.expires_in.map(Duration::seconds),
	})
}

/// Builds the rejection reported for a non-success status, with a bounded body preview.
pub fn rejection(status: u16, body: &[u8]) -> GatewayError {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();
	let preview = match trimmed.char_indices().nth(BODY_PREVIEW_LIMIT) {
		Some((idx, _)) => format!("{}…", &trimmed[..idx]),
		None => trimmed.to_owned(),
	};
	let reason = if preview.is_empty() {
		format!("HTTP {status}")
	} else {
		format!("HTTP {status}: {preview}")
	};

	GatewayError::Rejected { status: Some(status), reason }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decodes_camel_and_snake_case_payloads() {
		let camel = decode_login_response(
			br#"{"accessToken":"T-1","refreshToken":"R-1","expiresIn":480}"#,
		)
		.expect("camelCase payload should decode.");

		assert_eq!(camel.access_token.expose(), "T-1");
		assert_eq!(camel.refresh_token.as_ref().map(|token| token.expose()), Some("R-1"));
		assert_eq!(camel.expires_in, Some(Duration::seconds(480)));

		let snake = decode_login_response(br#"{"access_token":"T-2"}"#)
			.expect("snake_case payload without expiry should decode.");

		assert_eq!(snake.access_token.expose(), "T-2");
		assert_eq!(snake.expires_in, None);

		let short =
			decode_login_response(br#"{"token":"T-3","expiresInSeconds":480}"#).expect("decodes");

		assert_eq!(short.expires_in, Some(Duration::seconds(480)));
	}

	#[test]
	fn malformed_payloads_report_the_field_path() {
		let err = decode_login_response(br#"{"accessToken":"T-1","expiresIn":"soon"}"#)
			.expect_err("String lifetimes should be rejected.");

		match err {
			GatewayError::Malformed { reason } => assert!(reason.contains("expires")),
			other => panic!("Unexpected error: {other:?}."),
		}

		assert!(matches!(
			decode_login_response(br#"{"accessToken":""}"#),
			Err(GatewayError::Malformed { .. })
		));
	}

	#[test]
	fn rejection_previews_are_bounded() {
		let body = "x".repeat(BODY_PREVIEW_LIMIT * 2);

		match rejection(401, body.as_bytes()) {
			GatewayError::Rejected { status, reason } => {
				assert_eq!(status, Some(401));
				assert!(reason.len() < body.len());
			},
			other => panic!("Unexpected error: {other:?}."),
		}
		match rejection(503, b"") {
			GatewayError::Rejected { reason, .. } => assert_eq!(reason, "HTTP 503"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
