use crate::api::models::TokenResponse;
use crate::error::{AuthError, UpstreamError};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const USER_AGENT: &str = concat!("gamedex/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the identity endpoint and the metadata API.
///
/// Holds no token state itself; the credential cache owns the token and
/// passes it in per call.
#[derive(Debug, Clone)]
pub struct IgdbClient {
    client: Client,
    pub api_url: String,
    pub token_url: String,
    client_id: String,
    client_secret: String,
    timeout_secs: u64,
}

impl IgdbClient {
    pub fn new(
        api_url: String,
        token_url: String,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpstreamError::Network {
                endpoint: "client_init".to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(IgdbClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url,
            client_id,
            client_secret,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Exchange client credentials for a bearer token.
    pub async fn request_token(&self) -> Result<TokenResponse, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::RequestFailed {
                message: format!("{}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let server_message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::CredentialsRejected {
                status: status.as_u16(),
                server_message,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::MalformedResponse {
                message: format!("{}", e),
            })
    }

    /// POST an APICalypse query body to a metadata endpoint and decode the
    /// JSON response.
    pub async fn query<T>(&self, endpoint: &str, token: &str, body: &str) -> Result<T, UpstreamError>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self.build_request(endpoint, token).body(body.to_string());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout {
                    timeout_secs: self.timeout_secs,
                    endpoint: endpoint.to_string(),
                }
            } else {
                UpstreamError::Network {
                    endpoint: endpoint.to_string(),
                    message: format!("{}", e),
                }
            }
        })?;

        self.handle_response(response, endpoint).await
    }

    fn build_request(&self, endpoint: &str, token: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, endpoint);
        self.client
            .post(url)
            .header("Client-ID", &self.client_id)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
    }

    async fn handle_response<T>(&self, response: Response, endpoint: &str) -> Result<T, UpstreamError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| UpstreamError::MalformedPayload {
                    endpoint: endpoint.to_string(),
                    message: format!("Failed to parse response: {}", e),
                })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                408 | 504 => Err(UpstreamError::Timeout {
                    timeout_secs: self.timeout_secs,
                    endpoint: endpoint.to_string(),
                }),
                _ => Err(UpstreamError::Http {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    message: error_text,
                }),
            }
        }
    }
}
