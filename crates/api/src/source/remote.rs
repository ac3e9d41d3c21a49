use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use spacelift_outputs_types::{ConnectionConfig, OutputSet};
use tracing::{debug, error};

use super::OutputSource;
use crate::error::FetchError;
use crate::wire::{self, GraphQlRequest};

/// Upper bound for one request, connection through body read.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source that queries the Spacelift GraphQL endpoint.
///
/// Every call performs exactly one `POST` round trip; nothing is cached or
/// retried.
#[derive(Clone)]
pub struct RemoteSource {
    endpoint: String,
    credential: String,
    http: Client,
}

impl RemoteSource {
    pub fn new(config: &ConnectionConfig, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("spacelift-outputs/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS))
            .build()
            .map_err(|error| {
                error!(%error, "failed to build http client");
                FetchError::Transport(error)
            })?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            credential: config.credential.clone(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("endpoint", &self.endpoint)
            .field("credential", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OutputSource for RemoteSource {
    async fn fetch(&self, stack_id: &str) -> Result<OutputSet, FetchError> {
        debug!(url = %self.endpoint, stack_id, "sending request to SpaceLift API");

        let response = self
            .http
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.credential)
            .json(&GraphQlRequest::stack_outputs(stack_id))
            .send()
            .await
            .map_err(|error| {
                error!(%error, "failed to make request");
                FetchError::Transport(error)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            error!(%error, "failed to read response body");
            FetchError::Transport(error)
        })?;
        debug!(%status, bytes = body.len(), "received response");

        let outputs = wire::decode_stack_outputs(stack_id, &body)?;
        debug!(stack_id, output_count = outputs.len(), "successfully retrieved stack outputs");
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaLocation;
    use serde_json::json;
    use spacelift_outputs_types::Output;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ConnectionConfig {
        ConnectionConfig {
            endpoint: format!("{}/graphql", server.uri()),
            credential: "test-token".into(),
            account_name: "acme".into(),
        }
    }

    fn source_for(server: &MockServer) -> RemoteSource {
        RemoteSource::new(&config_for(server), DEFAULT_REQUEST_TIMEOUT).expect("build remote source")
    }

    #[tokio::test]
    async fn sends_authenticated_graphql_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({"variables": {"id": "stack-a"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stack": {"outputs": [
                    {"id": "vpc_id", "value": "vpc-123"},
                    {"id": "subnet", "value": "subnet-9"}
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let set = source_for(&server).fetch("stack-a").await.expect("fetch succeeds");
        assert_eq!(set.stack_id(), "stack-a");
        assert_eq!(set.outputs(), [Output::new("vpc_id", "vpc-123"), Output::new("subnet", "subnet-9")]);
    }

    #[tokio::test]
    async fn request_body_carries_the_query_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"query": wire::GET_STACK_OUTPUTS_QUERY})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"stack": {"outputs": []}}})))
            .expect(1)
            .mount(&server)
            .await;

        let set = source_for(&server).fetch("stack-a").await.expect("fetch succeeds");
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn surfaces_protocol_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "unauthorized"}, {"message": "ignored"}]
            })))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch("stack-a").await.unwrap_err();
        assert!(matches!(err, FetchError::Protocol { ref message } if message == "unauthorized"), "{err:?}");
    }

    #[tokio::test]
    async fn non_json_body_is_a_decoding_error_regardless_of_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch("stack-a").await.unwrap_err();
        assert!(matches!(err, FetchError::Decoding { .. }), "{err:?}");
        assert_eq!(err.body(), Some("bad gateway"));
    }

    #[tokio::test]
    async fn schema_errors_return_no_partial_outputs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stack": {"outputs": [{"id": "a", "value": "b"}, {"id": "c", "value": 3}]}}
            })))
            .mount(&server)
            .await;

        let err = source_for(&server).fetch("stack-a").await.unwrap_err();
        assert!(
            matches!(err, FetchError::Schema(ref schema) if schema.location() == SchemaLocation::Value),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn slow_endpoint_times_out_as_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"stack": {"outputs": []}}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let source = RemoteSource::new(&config_for(&server), Duration::from_millis(100)).unwrap();
        let err = source.fetch("stack-a").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(ref error) if error.is_timeout()), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let config = ConnectionConfig {
            endpoint: "http://127.0.0.1:1/graphql".into(),
            credential: "test-token".into(),
            account_name: "acme".into(),
        };
        let source = RemoteSource::new(&config, Duration::from_secs(2)).unwrap();
        let err = source.fetch("stack-a").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "{err:?}");
    }

    #[test]
    fn debug_output_hides_the_credential() {
        let config = ConnectionConfig {
            endpoint: "https://acme.app.spacelift.io/graphql".into(),
            credential: "super-secret".into(),
            account_name: "acme".into(),
        };
        let source = RemoteSource::new(&config, DEFAULT_REQUEST_TIMEOUT).unwrap();
        let rendered = format!("{source:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(source.endpoint(), "https://acme.app.spacelift.io/graphql");
    }
}
