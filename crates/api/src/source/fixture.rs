use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use spacelift_outputs_types::{Output, OutputSet};
use tracing::debug;

use super::OutputSource;
use crate::error::FetchError;

/// Source serving preloaded outputs without any network access.
///
/// Stacks that were not preloaded still resolve, to two placeholder outputs
/// `output1 = "value1-for-<stack>"` and `output2 = "value2-for-<stack>"`.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    stacks: HashMap<String, Vec<Output>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload the outputs of one stack, replacing earlier ones.
    pub fn with_stack(mut self, stack_id: impl Into<String>, outputs: Vec<Output>) -> Self {
        self.stacks.insert(stack_id.into(), outputs);
        self
    }

    /// Parse a fixture document of the form
    /// `{"<stack-id>": [{"id": "...", "value": "..."}]}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let stacks: HashMap<String, Vec<Output>> = serde_json::from_str(content).context("parse output fixtures")?;
        Ok(Self { stacks })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read fixture file: {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("Invalid fixture file: {}", path.display()))
    }

    pub fn outputs_for(&self, stack_id: &str) -> OutputSet {
        match self.stacks.get(stack_id) {
            Some(outputs) => OutputSet::new(stack_id, outputs.clone()),
            None => {
                debug!(stack_id, "no fixture for stack, using placeholder outputs");
                OutputSet::new(
                    stack_id,
                    vec![
                        Output::new("output1", format!("value1-for-{stack_id}")),
                        Output::new("output2", format!("value2-for-{stack_id}")),
                    ],
                )
            }
        }
    }
}

#[async_trait]
impl OutputSource for FixtureSource {
    async fn fetch(&self, stack_id: &str) -> Result<OutputSet, FetchError> {
        debug!(stack_id, "using fixture outputs");
        Ok(self.outputs_for(stack_id))
    }
}
