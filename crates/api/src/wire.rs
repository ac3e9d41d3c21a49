//! GraphQL wire format for the stack outputs query.
//!
//! Responses are decoded in two steps. The body is first deserialized into a
//! permissive schema in which every field is optional and every leaf accepts
//! any JSON shape ([`Shape`]), so only a malformed document fails at this
//! stage. A single validation pass then turns the first missing or mistyped
//! field into a [`SchemaError`] naming its location.
//!
//! Levels that must be JSON objects go through [`Object`], since derived
//! struct impls also accept a JSON array.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use spacelift_outputs_types::{Output, OutputSet};
use tracing::error;

use crate::error::{FetchError, SchemaError, SchemaLocation};

pub const GET_STACK_OUTPUTS_QUERY: &str = r#"
query getStackOutputs($id: ID!) {
  stack(id: $id) {
    outputs {
      id
      value
    }
  }
}
"#;

/// Request body sent to the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: StackVariables<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackVariables<'a> {
    pub id: &'a str,
}

impl<'a> GraphQlRequest<'a> {
    pub fn stack_outputs(stack_id: &'a str) -> Self {
        Self {
            query: GET_STACK_OUTPUTS_QUERY,
            variables: StackVariables { id: stack_id },
        }
    }
}

/// A field that either has the expected type or holds whatever was sent instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Shape<T> {
    Valid(T),
    Invalid(Value),
}

/// Like [`Shape`], but only a JSON object can be `Valid`.
#[derive(Debug)]
struct Object<T>(Shape<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Object<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(Self(Shape::Invalid(value)));
        }
        let shape = match T::deserialize(&value) {
            Ok(valid) => Shape::Valid(valid),
            Err(_) => Shape::Invalid(value),
        };
        Ok(Self(shape))
    }
}

impl<T> Object<T> {
    fn into_shape(self) -> Shape<T> {
        self.0
    }
}

fn valid<T>(field: Option<Shape<T>>) -> Result<T, Option<Value>> {
    match field {
        Some(Shape::Valid(value)) => Ok(value),
        Some(Shape::Invalid(value)) => Err(Some(value)),
        None => Err(None),
    }
}

/// A list whose entries must all be JSON objects, otherwise the document is malformed.
fn object_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(entries) = Option::<Vec<Map<String, Value>>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    entries
        .into_iter()
        .map(|entry| T::deserialize(Value::Object(entry)).map_err(de::Error::custom))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Object<ResponseData>>,
    #[serde(default, deserialize_with = "object_list")]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default)]
    stack: Option<Object<StackData>>,
}

#[derive(Debug, Deserialize)]
struct StackData {
    #[serde(default)]
    outputs: Option<Shape<Vec<Object<OutputData>>>>,
}

#[derive(Debug, Deserialize)]
struct OutputData {
    #[serde(default)]
    id: Option<Shape<String>>,
    #[serde(default)]
    value: Option<Shape<String>>,
}

/// Decode a response body into the outputs of `stack_id`.
pub fn decode_stack_outputs(stack_id: &str, body: &str) -> Result<OutputSet, FetchError> {
    let response = serde_json::from_str::<Map<String, Value>>(body)
        .and_then(|document| GraphQlResponse::deserialize(Value::Object(document)))
        .map_err(|source| {
            error!(error = %source, body, "failed to unmarshal response");
            FetchError::decoding(body, source)
        })?;
    response.validate(stack_id)
}

impl GraphQlResponse {
    fn validate(self, stack_id: &str) -> Result<OutputSet, FetchError> {
        if let Some(first) = self.errors.as_deref().and_then(|errors| errors.first()) {
            error!(error = %first.message, "GraphQL error in response");
            return Err(FetchError::protocol(first.message.clone()));
        }

        let stack = valid(self.data.map(Object::into_shape))
            .ok()
            .and_then(|data: ResponseData| valid(data.stack.map(Object::into_shape)).ok())
            .ok_or_else(|| schema_error(SchemaError::new(SchemaLocation::Stack), None))?;

        let elements = valid(stack.outputs)
            .map_err(|found| schema_error(SchemaError::new(SchemaLocation::Outputs), found.as_ref()))?;

        let outputs = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| validate_output(index, element))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OutputSet::new(stack_id, outputs))
    }
}

fn validate_output(index: usize, element: Object<OutputData>) -> Result<Output, FetchError> {
    let output = match element.into_shape() {
        Shape::Valid(output) => output,
        Shape::Invalid(found) => {
            return Err(schema_error(SchemaError::at_output(SchemaLocation::Output, index), Some(&found)));
        }
    };
    let id = valid(output.id).map_err(|found| schema_error(SchemaError::at_output(SchemaLocation::Id, index), found.as_ref()))?;
    let value =
        valid(output.value).map_err(|found| schema_error(SchemaError::at_output(SchemaLocation::Value, index), found.as_ref()))?;
    Ok(Output { id, value })
}

fn schema_error(schema: SchemaError, found: Option<&Value>) -> FetchError {
    match found {
        Some(found) => error!(location = %schema.location(), %found, "invalid response format"),
        None => error!(location = %schema.location(), "invalid response format"),
    }
    FetchError::Schema(schema)
}
