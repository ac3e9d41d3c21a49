//! Error types for stack output retrieval.

use std::fmt;

use thiserror::Error;

/// Failure of a single fetch round trip.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("stack id must not be empty")]
    EmptyStackId,

    /// Request construction, connection, timeout or body read failure.
    #[error("error making request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body is not a JSON document.
    #[error("error unmarshalling response: {source}")]
    Decoding {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint reported errors; carries the first message verbatim.
    #[error("GraphQL error: {message}")]
    Protocol { message: String },

    #[error("invalid response format: {0}")]
    Schema(#[from] SchemaError),
}

impl FetchError {
    pub fn decoding(body: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decoding {
            body: body.into(),
            source,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol { message: message.into() }
    }

    /// The raw response body, when the failure happened while decoding it.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Decoding { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Where in the response document validation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaLocation {
    Stack,
    Outputs,
    Output,
    Id,
    Value,
}

impl SchemaLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Outputs => "outputs",
            Self::Output => "output",
            Self::Id => "id",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The response document did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    location: SchemaLocation,
    index: Option<usize>,
}

impl SchemaError {
    pub fn new(location: SchemaLocation) -> Self {
        Self { location, index: None }
    }

    /// Schema error for the output element at `index`.
    pub fn at_output(location: SchemaLocation, index: usize) -> Self {
        Self {
            location,
            index: Some(index),
        }
    }

    pub fn location(&self) -> SchemaLocation {
        self.location
    }

    /// Position of the offending element in the outputs array.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.location {
            SchemaLocation::Stack => "stack data not found",
            SchemaLocation::Outputs => "outputs data not found",
            SchemaLocation::Output => "invalid output format",
            SchemaLocation::Id => "invalid output id format",
            SchemaLocation::Value => "invalid output value format",
        };
        match self.index {
            Some(index) => write!(f, "{message} (outputs[{index}])"),
            None => f.write_str(message),
        }
    }
}

impl std::error::Error for SchemaError {}

/// The requested output is absent from an otherwise valid output set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Output with name '{name}' not found in stack '{stack_id}'")]
pub struct OutputNotFound {
    pub name: String,
    pub stack_id: String,
}

/// Failure of a record read.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not read stack outputs: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NotFound(#[from] OutputNotFound),
}
