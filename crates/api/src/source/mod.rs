//! Output sources backing an [`OutputClient`](crate::OutputClient).
//!
//! Modules:
//! - `remote`: GraphQL-over-HTTPS source talking to the Spacelift API
//! - `fixture`: Preloaded source for tests and offline operation

mod fixture;
mod remote;

use std::fmt;

use async_trait::async_trait;
use spacelift_outputs_types::OutputSet;

use crate::error::FetchError;

pub use fixture::FixtureSource;
pub use remote::{DEFAULT_REQUEST_TIMEOUT, RemoteSource};

/// Capability that produces the outputs of a stack.
#[async_trait]
pub trait OutputSource: Send + Sync + fmt::Debug {
    async fn fetch(&self, stack_id: &str) -> Result<OutputSet, FetchError>;
}
