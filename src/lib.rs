//! Single-flight, multi-context credential cache for test suites that drive a multi-tenant
//! platform: log in once per identity, share the short-lived token across every concurrent
//! worker, and never stampede the login endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod obs;
pub mod policy;
pub mod resolver;

pub use cache::{CacheOptions, CredentialCache};
pub use coordinator::{LoginCoordinator, LoginMetrics};
pub use error::{ConfigError, Error, Result};

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
