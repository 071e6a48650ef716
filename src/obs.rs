//! Optional observability helpers for cache lookups and login flights.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `credential_cache.login` with the `context`
//!   and `stage` fields, plus a `warn` event for every failed login.
//! - Enable `metrics` to increment the `credential_cache_lookup_total` counter for every lookup
//!   outcome, labeled by `context` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupOutcome {
	/// Served from a valid cached entry.
	Hit,
	/// No valid entry; a login was performed or joined.
	Miss,
	/// Attached to a login another caller had in flight.
	Joined,
	/// Login settled successfully.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl LookupOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LookupOutcome::Hit => "hit",
			LookupOutcome::Miss => "miss",
			LookupOutcome::Joined => "joined",
			LookupOutcome::Success => "success",
			LookupOutcome::Failure => "failure",
		}
	}
}
impl Display for LookupOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
