//! Read models for the two stack output data sources.
//!
//! [`StackOutputsRecord`] exposes every output of a stack as a map and
//! [`StackOutputRecord`] exposes a single named output. Both are stamped with
//! the time of the read.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use spacelift_outputs_types::OutputSet;

use crate::client::OutputClient;
use crate::error::Error;
use crate::lookup::find_output;

/// All outputs of one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutputsRecord {
    pub id: String,
    pub stack_id: String,
    pub outputs: IndexMap<String, String>,
    pub last_check: String,
}

impl StackOutputsRecord {
    pub async fn read(client: &OutputClient, stack_id: &str) -> Result<Self, Error> {
        let outputs = client.fetch(stack_id).await?;
        Ok(Self::from_outputs(&outputs, now_rfc3339()))
    }

    pub fn from_outputs(outputs: &OutputSet, last_check: String) -> Self {
        Self {
            id: outputs.stack_id().to_string(),
            stack_id: outputs.stack_id().to_string(),
            outputs: outputs.to_map(),
            last_check,
        }
    }
}

/// One named output of a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackOutputRecord {
    /// `<stack_id>:<output_name>`
    pub id: String,
    pub stack_id: String,
    pub output_name: String,
    pub value: String,
    pub last_check: String,
}

impl StackOutputRecord {
    pub async fn read(client: &OutputClient, stack_id: &str, output_name: &str) -> Result<Self, Error> {
        let outputs = client.fetch(stack_id).await?;
        Self::from_outputs(&outputs, output_name, now_rfc3339())
    }

    pub fn from_outputs(outputs: &OutputSet, output_name: &str, last_check: String) -> Result<Self, Error> {
        let value = find_output(outputs, output_name)?;
        Ok(Self {
            id: format!("{}:{}", outputs.stack_id(), output_name),
            stack_id: outputs.stack_id().to_string(),
            output_name: output_name.to_string(),
            value: value.to_string(),
            last_check,
        })
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
