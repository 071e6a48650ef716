//! Identity contexts, credential records, and token models.

pub mod credential;
pub mod id;
pub mod token;

pub use credential::*;
pub use id::*;
pub use token::{entry::*, secret::*};
