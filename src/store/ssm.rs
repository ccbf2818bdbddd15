use super::{ParameterStore, StoreError, StoreFuture};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

const TARGET_HEADER: &str = "x-amz-target";
const GET_PARAMETERS_TARGET: &str = "AmazonSSM.GetParameters";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Parameter store speaking the SSM `GetParameters` JSON protocol.
///
/// Requests are sent unsigned to the configured endpoint, which suits local
/// SSM-compatible services such as LocalStack.
#[derive(Debug, Clone)]
pub struct SsmStore {
    client: reqwest::Client,
    endpoint: String,
}

impl SsmStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_parameters(
        &self,
        name: &str,
        with_decryption: bool,
    ) -> Result<Option<String>, StoreError> {
        let body = serde_json::to_vec(&GetParametersRequest {
            names: [name],
            with_decryption,
        })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(TARGET_HEADER, GET_PARAMETERS_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let parsed: GetParametersResponse = serde_json::from_slice(&bytes)?;
        if !parsed.invalid_parameters.is_empty() {
            tracing::debug!(
                names = ?parsed.invalid_parameters,
                "parameter store reported unknown parameters"
            );
        }

        Ok(parsed
            .parameters
            .into_iter()
            .find(|parameter| parameter.name.as_deref().map_or(true, |n| n == name))
            .map(|parameter| parameter.value))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(Box::new(err))
    }
}

impl ParameterStore for SsmStore {
    fn get_parameter<'a>(&'a self, name: &'a str, with_decryption: bool) -> StoreFuture<'a> {
        Box::pin(self.get_parameters(name, with_decryption))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersRequest<'a> {
    names: [&'a str; 1],
    with_decryption: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersResponse {
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    invalid_parameters: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Parameter {
    #[serde(default)]
    name: Option<String>,
    value: String,
}
