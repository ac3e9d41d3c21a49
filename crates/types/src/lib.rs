//! Shared data model for Spacelift stack output retrieval.
//!
//! These types carry no behaviour beyond construction and inspection; the
//! resolution, fetching and lookup logic lives in `spacelift-outputs-api`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single named value exported by a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// The output name (e.g., "vpc_id")
    pub id: String,
    /// The output value as rendered by the endpoint
    pub value: String,
}

impl Output {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Outputs of one stack, in the order the endpoint returned them.
///
/// Duplicate ids are kept as-is. Callers must not assume any sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSet {
    stack_id: String,
    outputs: Vec<Output>,
}

impl OutputSet {
    pub fn new(stack_id: impl Into<String>, outputs: Vec<Output>) -> Self {
        Self {
            stack_id: stack_id.into(),
            outputs,
        }
    }

    /// Identifier of the stack these outputs were fetched for.
    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Output> {
        self.outputs.iter()
    }

    /// Project the set into a name → value map.
    ///
    /// A later duplicate overwrites the value of an earlier one while the key
    /// keeps its first position.
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::with_capacity(self.outputs.len());
        for output in &self.outputs {
            map.insert(output.id.clone(), output.value.clone());
        }
        map
    }
}

impl<'a> IntoIterator for &'a OutputSet {
    type Item = &'a Output;
    type IntoIter = std::slice::Iter<'a, Output>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.iter()
    }
}

/// An explicitly supplied configuration setting.
///
/// `Unknown` marks a value the caller did supply but could not evaluate yet
/// (for example, one that depends on a resource that does not exist). It is
/// never silently replaced by a fallback.
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigValue<T> {
    /// Not supplied at all
    Null,
    /// Supplied, but not yet determined
    Unknown,
    /// Supplied and determined
    Known(T),
}

impl<T> ConfigValue<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The determined value, if any.
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }
}

impl<T> Default for ConfigValue<T> {
    fn default() -> Self {
        Self::Null
    }
}

impl<T> From<Option<T>> for ConfigValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Known(value),
            None => Self::Null,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Unknown => f.write_str("Unknown"),
            Self::Known(value) => f.debug_tuple("Known").field(value).finish(),
        }
    }
}

/// Connection settings as supplied by the caller, before resolution.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExplicitConfig {
    pub api_token: ConfigValue<String>,
    pub api_url: ConfigValue<String>,
    pub account_name: ConfigValue<String>,
}

impl fmt::Debug for ExplicitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_token = match &self.api_token {
            ConfigValue::Null => "Null",
            ConfigValue::Unknown => "Unknown",
            ConfigValue::Known(_) => "Known(<redacted>)",
        };
        f.debug_struct("ExplicitConfig")
            .field("api_token", &format_args!("{api_token}"))
            .field("api_url", &self.api_url)
            .field("account_name", &self.account_name)
            .finish()
    }
}

/// Effective connection settings, immutable once resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Bearer credential; never empty after resolution
    pub credential: String,
    /// Account the endpoint belongs to
    pub account_name: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("credential", &"<redacted>")
            .field("account_name", &self.account_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_set_keeps_duplicates_in_order() {
        let set = OutputSet::new(
            "stack-a",
            vec![Output::new("a", "1"), Output::new("b", "2"), Output::new("a", "3")],
        );
        let ids: Vec<_> = set.iter().map(|output| output.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "a"]);
        assert_eq!(set.stack_id(), "stack-a");
    }

    #[test]
    fn to_map_lets_later_duplicates_win() {
        let set = OutputSet::new(
            "stack-a",
            vec![Output::new("a", "1"), Output::new("b", "2"), Output::new("a", "3")],
        );
        let map = set.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_index(0), Some((&"a".to_string(), &"3".to_string())));
        assert_eq!(map["b"], "2");
    }

    #[test]
    fn config_value_from_option() {
        assert_eq!(ConfigValue::from(Some("x".to_string())).known().map(String::as_str), Some("x"));
        assert!(ConfigValue::<String>::from(None).is_null());
        assert!(ConfigValue::<String>::Unknown.known().is_none());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = ConnectionConfig {
            endpoint: "https://acme.app.spacelift.io/graphql".into(),
            credential: "super-secret".into(),
            account_name: "acme".into(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"), "{rendered}");
        assert!(rendered.contains("acme"));

        let explicit = ExplicitConfig {
            api_token: ConfigValue::Known("super-secret".into()),
            ..ExplicitConfig::default()
        };
        let rendered = format!("{explicit:?}");
        assert!(!rendered.contains("super-secret"), "{rendered}");
        assert!(rendered.contains("Known(<redacted>)"));
    }

    #[test]
    fn output_round_trips_through_json_shape() {
        let output: Output = serde_json::from_str(r#"{"id":"vpc_id","value":"vpc-123"}"#).unwrap();
        assert_eq!(output, Output::new("vpc_id", "vpc-123"));
    }
}
