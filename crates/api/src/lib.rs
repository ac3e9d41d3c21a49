//! Spacelift stack outputs client.
//!
//! This crate retrieves the outputs of Spacelift stacks through the GraphQL
//! API. It focuses on:
//!
//! - Resolving connection settings from explicit configuration, the
//!   environment and built-in defaults ([`config::resolve`])
//! - Querying the endpoint and validating the loosely-typed response
//!   ([`OutputClient`], [`wire`])
//! - Looking up a single named output ([`find_output`])
//! - Reporting every failure as a distinct error kind ([`error`])
//!
//! # Example
//!
//! ```ignore
//! use spacelift_outputs_api::{OutputClient, ProcessEnvironment, find_output, resolve};
//! use spacelift_outputs_types::ExplicitConfig;
//!
//! async fn vpc_id() -> anyhow::Result<String> {
//!     let config = resolve(&ExplicitConfig::default(), &ProcessEnvironment)?;
//!     let client = OutputClient::remote(&config)?;
//!     let outputs = client.fetch("networking-prod").await?;
//!     Ok(find_output(&outputs, "vpc_id")?.to_string())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod records;
pub mod source;
pub mod wire;

pub use client::OutputClient;
pub use config::{ConfigError, ConfigErrors, ConfigField, ConfigSources, EnvSources, EnvironmentView, ProcessEnvironment, resolve};
pub use error::{Error, FetchError, OutputNotFound, SchemaError, SchemaLocation};
pub use lookup::find_output;
pub use records::{StackOutputRecord, StackOutputsRecord};
pub use source::{FixtureSource, OutputSource, RemoteSource};
