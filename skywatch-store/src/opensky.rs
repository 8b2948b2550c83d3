use std::time::Duration;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};
use skywatch_core::feed::{FlightSource, TimeWindow};
use skywatch_core::{CoreError, CoreResult, Direction, FlightObservation};
use crate::app_config::OpenSkyConfig;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("OpenSky credentials are not configured")]
    MissingCredentials,
    #[error("token request failed: {0}")]
    Token(String),
    #[error("rate limit hit for {0}")]
    RateLimited(String),
    #[error("OpenSky API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client for the OpenSky flights-by-airport endpoints.
///
/// A bearer token is obtained through the client-credentials grant before
/// every query.
#[derive(Clone)]
pub struct OpenSkyClient {
    http: reqwest::Client,
    api_url: String,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl OpenSkyClient {
    pub fn new(config: &OpenSkyConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone().filter(|s| !s.is_empty()),
            client_secret: config.client_secret.clone().filter(|s| !s.is_empty()),
        })
    }

    pub async fn access_token(&self) -> Result<String, FeedError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(FeedError::MissingCredentials);
        };

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];

        let response = self.http.post(&self.token_url).form(&params).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Token(format!("status {}: {}", status, truncate(&body))));
        }

        let token: TokenResponse = response.json().await?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FeedError::Token("response carried no access_token".to_string()))
    }

    /// 404 means no flights in the window and yields an empty list.
    pub async fn fetch_flights(
        &self,
        airport_code: &str,
        direction: Direction,
        window: TimeWindow,
    ) -> Result<Vec<FlightObservation>, FeedError> {
        let token = self.access_token().await?;
        let endpoint = format!("{}/flights/{}", self.api_url, direction.endpoint());

        let response = self
            .http
            .get(&endpoint)
            .query(&[
                ("airport", airport_code.to_string()),
                ("begin", window.begin.to_string()),
                ("end", window.end.to_string()),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let flights: Vec<FlightObservation> = response.json().await?;
                debug!("{} {} flights for {}", flights.len(), direction.endpoint(), airport_code);
                Ok(flights)
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("RATE LIMIT HIT for {}. Skipping to avoid ban.", airport_code);
                Err(FeedError::RateLimited(airport_code.to_string()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(FeedError::Status { status, body: truncate(&body) })
            }
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

#[async_trait]
impl FlightSource for OpenSkyClient {
    async fn fetch(
        &self,
        airport_code: &str,
        direction: Direction,
        window: TimeWindow,
    ) -> CoreResult<Vec<FlightObservation>> {
        self.fetch_flights(airport_code, direction, window)
            .await
            .map_err(|e| CoreError::ExternalSourceError(e.to_string()))
    }
}
