//! HTTP client for the hosted auth and data endpoints

use reqwest::{header, Client, RequestBuilder, Response};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
};

/// Thin wrapper around a `reqwest::Client` that knows the project URL and
/// attaches the API key to every request.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl RestClient {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("rental-desk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Request against the auth endpoint; user-scoped calls pass the access token
    pub fn auth(&self, method: reqwest::Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        self.with_keys(self.http.request(method, self.auth_url(path)), access_token)
    }

    /// GET request against a table of the data endpoint
    pub fn table(&self, table: &str, access_token: Option<&str>) -> RequestBuilder {
        self.with_keys(self.http.get(self.rest_url(table)), access_token)
    }

    fn with_keys(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        // Without a user token the anon key doubles as the bearer token
        let bearer = access_token.unwrap_or(&self.anon_key);
        builder
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
    }
}

/// Turn a non-success response into an `AppError::Remote`
pub async fn check(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Remote call failed with {}: {}", status, body);
    Err(AppError::remote(status.as_u16(), &body))
}
