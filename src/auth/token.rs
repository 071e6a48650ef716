//! Cached token entries and the secret wrapper that keeps them out of logs.

pub mod entry;
pub mod secret;
