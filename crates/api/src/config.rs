//! Connection settings resolution.
//!
//! Settings are resolved from three layers, highest precedence first:
//!
//! 1. Explicit configuration supplied by the caller ([`ExplicitConfig`])
//! 2. Environment values, read through an [`EnvironmentView`] from an ordered
//!    list of variable names ([`EnvSources`]); the first non-empty one wins
//! 3. The hard-coded default account name
//!
//! The variable lists are data ([`ConfigSources`]). [`resolve`] uses the
//! standard ones and [`ConfigSources::resolve`] accepts any other order.
//!
//! The endpoint is never read from the environment. When it is not supplied
//! explicitly it is derived from the resolved account name.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use spacelift_outputs_types::{ConfigValue, ConnectionConfig, ExplicitConfig};
use thiserror::Error;
use tracing::{debug, error};

/// Account name used when neither configuration nor environment provide one.
pub const DEFAULT_ACCOUNT_NAME: &str = "eaglespirittech";
/// Domain under which every account's GraphQL endpoint is served.
pub const SPACELIFT_DOMAIN: &str = "app.spacelift.io";

/// Environment variables consulted for the API token.
pub const CREDENTIAL_SOURCES: EnvSources = EnvSources {
    field: ConfigField::ApiToken,
    names: &["SPACELIFT_API_TOKEN"],
};

/// Environment variables consulted for the account name, in priority order.
///
/// Both names are honoured; the `TF_VAR_` form takes precedence.
pub const ACCOUNT_NAME_SOURCES: EnvSources = EnvSources {
    field: ConfigField::AccountName,
    names: &["TF_VAR_spacelift_account_name", "spacelift_account_name"],
};

/// Read-only view of environment-provided values.
pub trait EnvironmentView {
    fn var(&self, name: &str) -> Option<String>;
}

/// [`EnvironmentView`] over the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentView for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> EnvironmentView for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// An ordered list of environment variable names feeding one setting.
#[derive(Debug, Clone, Copy)]
pub struct EnvSources {
    pub field: ConfigField,
    pub names: &'static [&'static str],
}

impl EnvSources {
    /// First non-empty value among `names`, paired with the variable it came from.
    pub fn lookup(&self, env: &dyn EnvironmentView) -> Option<(&'static str, String)> {
        let found = self
            .names
            .iter()
            .find_map(|&name| env.var(name).filter(|value| !value.is_empty()).map(|value| (name, value)));
        if found.is_none() {
            debug!(field = %self.field, variables = ?self.names, "no environment value set");
        }
        found
    }
}

/// Environment variable lists consulted by [`ConfigSources::resolve`].
#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub credential: EnvSources,
    pub account_name: EnvSources,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            credential: CREDENTIAL_SOURCES,
            account_name: ACCOUNT_NAME_SOURCES,
        }
    }
}

/// A configurable connection setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    ApiToken,
    ApiUrl,
    AccountName,
}

impl ConfigField {
    /// Attribute name as it appears in configuration.
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::ApiToken => "api_token",
            Self::ApiUrl => "api_url",
            Self::AccountName => "account_name",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::ApiToken => "SpaceLift API Token",
            Self::ApiUrl => "SpaceLift API URL",
            Self::AccountName => "Account Name",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown {}", .field.title())]
    UnknownValue { field: ConfigField },

    #[error("Missing SpaceLift API Token")]
    MissingCredential,
}

impl ConfigError {
    pub fn field(&self) -> ConfigField {
        match self {
            Self::UnknownValue { field } => *field,
            Self::MissingCredential => ConfigField::ApiToken,
        }
    }

    /// Remediation text to show alongside the summary.
    pub fn detail(&self) -> String {
        match self {
            Self::UnknownValue { field } => {
                let fallback = match field {
                    ConfigField::ApiToken => "use the SPACELIFT_API_TOKEN environment variable",
                    ConfigField::ApiUrl | ConfigField::AccountName => "use the default value",
                };
                let subject = match field {
                    ConfigField::AccountName => "the account name".to_string(),
                    other => format!("the {}", other.title()),
                };
                format!(
                    "The provider cannot create the SpaceLift API client as there is an unknown configuration value for {subject}. \
                     Either target apply the source of the value first, set the value statically in the configuration, or {fallback}."
                )
            }
            Self::MissingCredential => "The provider cannot create the SpaceLift API client as there is a missing or empty value for the SpaceLift API token. \
                 Set the api_token value in the configuration or use the SPACELIFT_API_TOKEN environment variable. \
                 If either is already set, ensure the value is not empty."
                .to_string(),
        }
    }
}

/// Every configuration problem found during one resolution. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(Vec<ConfigError>);

impl ConfigErrors {
    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{} ({}): {}", error, error.field(), error.detail())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

/// Resolve effective connection settings from the standard environment variables.
pub fn resolve(explicit: &ExplicitConfig, env: &dyn EnvironmentView) -> Result<ConnectionConfig, ConfigErrors> {
    ConfigSources::default().resolve(explicit, env)
}

impl ConfigSources {
    /// Resolve effective connection settings from these variable lists.
    ///
    /// Unknown explicit values are all reported together. The missing credential
    /// check only runs when none were found.
    pub fn resolve(&self, explicit: &ExplicitConfig, env: &dyn EnvironmentView) -> Result<ConnectionConfig, ConfigErrors> {
        let unknown: Vec<ConfigError> = [
            (ConfigField::ApiToken, &explicit.api_token),
            (ConfigField::ApiUrl, &explicit.api_url),
            (ConfigField::AccountName, &explicit.account_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_unknown())
        .map(|(field, _)| {
            error!(%field, "unknown configuration value");
            ConfigError::UnknownValue { field }
        })
        .collect();
        if !unknown.is_empty() {
            return Err(ConfigErrors(unknown));
        }

        let credential = match &explicit.api_token {
            ConfigValue::Known(token) => {
                debug!("using API token from configuration");
                token.clone()
            }
            _ => match self.credential.lookup(env) {
                Some((variable, token)) => {
                    debug!(variable, "using API token from environment");
                    token
                }
                None => String::new(),
            },
        };

        let account_name = match &explicit.account_name {
            ConfigValue::Known(account_name) => {
                debug!(%account_name, "using account name from configuration");
                account_name.clone()
            }
            _ => match self.account_name.lookup(env) {
                Some((variable, account_name)) => {
                    debug!(variable, %account_name, "using account name from environment");
                    account_name
                }
                None => {
                    debug!(account_name = DEFAULT_ACCOUNT_NAME, "using default account name");
                    DEFAULT_ACCOUNT_NAME.to_string()
                }
            },
        };

        let endpoint = match &explicit.api_url {
            ConfigValue::Known(api_url) => {
                debug!(%api_url, "using API URL from configuration");
                api_url.clone()
            }
            _ => {
                let api_url = endpoint_for_account(&account_name);
                debug!(%api_url, "constructed API URL");
                api_url
            }
        };

        if credential.is_empty() {
            error!("missing SpaceLift API token");
            return Err(ConfigErrors(vec![ConfigError::MissingCredential]));
        }

        Ok(ConnectionConfig {
            endpoint,
            credential,
            account_name,
        })
    }
}

/// GraphQL endpoint of an account.
pub fn endpoint_for_account(account_name: &str) -> String {
    format!("https://{account_name}.{SPACELIFT_DOMAIN}/graphql")
}
