//! HTTP client for the Hangar REST API.

use crate::CliResult;
use hangar_core::{Ship, ShipInput, ShipQuery};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Normalize the server URL for consistent API requests.
fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Turn a non-success response into an error carrying the server message.
async fn checked(response: Response) -> CliResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    if message.is_empty() {
        Err(format!("server returned {status}").into())
    } else {
        Err(format!("server returned {status}: {message}").into())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    let value = checked(response).await?.json::<T>().await?;
    Ok(value)
}

/// Thin wrapper over the `/rest/ships` endpoints.
pub struct ShipClient {
    http: Client,
    base_url: String,
}

impl ShipClient {
    /// Build a client for the server at `server_url`.
    pub fn new(server_url: &str) -> CliResult<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: normalize_server_url(server_url)?,
        })
    }

    fn ships_url(&self) -> String {
        format!("{}/rest/ships", self.base_url)
    }

    fn ship_url(&self, id: i64) -> String {
        format!("{}/rest/ships/{id}", self.base_url)
    }

    /// One page of ships matching `query`.
    pub async fn list(&self, query: &ShipQuery) -> CliResult<Vec<Ship>> {
        let response = self.http.get(self.ships_url()).query(query).send().await?;
        read_json(response).await
    }

    /// Number of ships matching the filters in `query`.
    pub async fn count(&self, query: &ShipQuery) -> CliResult<i64> {
        let url = format!("{}/count", self.ships_url());
        let response = self.http.get(url).query(query).send().await?;
        read_json(response).await
    }

    /// Fetch ship `id`.
    pub async fn get(&self, id: i64) -> CliResult<Ship> {
        let response = self.http.get(self.ship_url(id)).send().await?;
        read_json(response).await
    }

    /// Create a ship from `input`.
    pub async fn create(&self, input: &ShipInput) -> CliResult<Ship> {
        let response = self.http.post(self.ships_url()).json(input).send().await?;
        read_json(response).await
    }

    /// Apply the fields present in `input` to ship `id`.
    pub async fn update(&self, id: i64, input: &ShipInput) -> CliResult<Ship> {
        let response = self.http.post(self.ship_url(id)).json(input).send().await?;
        read_json(response).await
    }

    /// Delete ship `id`.
    pub async fn delete(&self, id: i64) -> CliResult<()> {
        let response = self.http.delete(self.ship_url(id)).send().await?;
        checked(response).await?;
        Ok(())
    }
}
