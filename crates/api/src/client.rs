use std::sync::Arc;
use std::time::Duration;

use spacelift_outputs_types::{ConnectionConfig, OutputSet};
use tracing::debug;

use crate::error::FetchError;
use crate::source::{DEFAULT_REQUEST_TIMEOUT, FixtureSource, OutputSource, RemoteSource};

/// Client for retrieving stack outputs.
///
/// The output source is chosen once at construction and never changes. The
/// client holds no mutable state, so clones can be shared across tasks.
#[derive(Debug, Clone)]
pub struct OutputClient {
    source: Arc<dyn OutputSource>,
}

impl OutputClient {
    /// Client backed by the GraphQL endpoint in `config`.
    pub fn remote(config: &ConnectionConfig) -> Result<Self, FetchError> {
        Self::remote_with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn remote_with_timeout(config: &ConnectionConfig, timeout: Duration) -> Result<Self, FetchError> {
        debug!(endpoint = %config.endpoint, ?timeout, "creating SpaceLift client");
        Ok(Self::with_source(Arc::new(RemoteSource::new(config, timeout)?)))
    }

    /// Client backed by preloaded outputs.
    pub fn fixture(source: FixtureSource) -> Self {
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<dyn OutputSource>) -> Self {
        Self { source }
    }

    /// Fetch every output of `stack_id`, in endpoint order.
    pub async fn fetch(&self, stack_id: &str) -> Result<OutputSet, FetchError> {
        if stack_id.is_empty() {
            return Err(FetchError::EmptyStackId);
        }
        debug!(stack_id, "getting stack outputs");
        self.source.fetch(stack_id).await
    }
}
