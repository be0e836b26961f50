// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Nameserver control API client.
//!
//! Talks to a PowerDNS-compatible HTTP API authenticated with an `X-API-Key`
//! header. It covers exactly what the engine needs:
//!
//! - Fetching a zone's serial and RRsets
//! - Patching RRsets in one request per batch
//! - Probing zone existence and creating reverse zones
//!
//! Requests are not retried. A non-success status, or a success body that
//! still carries an `error` member, becomes an [`ApiError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use zonesync::collaborators::ControlApi;
//! use zonesync::pdns::PdnsClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = PdnsClient::new("127.0.0.1:8081", "localhost", "secret", Duration::from_secs(30))?;
//! let zone = client.fetch_zone("example.com").await?;
//! println!("serial {}", zone.serial);
//! # Ok(())
//! # }
//! ```

pub mod types;

use crate::collaborators::{ControlApi, ZoneCatalog, ZoneSnapshot};
use crate::constants::API_KEY_HEADER;
use crate::errors::ApiError;
use crate::metrics;
use crate::records::{zone_fqdn, ChangeOperation, PatchBody};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use types::{CreateZoneRequest, ErrorBody};

/// HTTP client for one nameserver's control API.
#[derive(Debug, Clone)]
pub struct PdnsClient {
    client: Arc<HttpClient>,
    base_url: String,
    server_id: String,
    api_key: Arc<String>,
}

impl PdnsClient {
    /// Create a client for `api_url` (scheme optional) and `server_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpConnectionFailed`] when the URL is malformed or
    /// the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        server_id: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Self::build_api_url(api_url);
        url::Url::parse(&base_url).map_err(|e| ApiError::HttpConnectionFailed {
            endpoint: base_url.clone(),
            reason: format!("invalid API URL: {e}"),
        })?;

        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::HttpConnectionFailed {
                endpoint: base_url.clone(),
                reason: format!("building HTTP client: {e}"),
            })?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            server_id: server_id.to_string(),
            api_key: Arc::new(api_key.to_string()),
        })
    }

    /// Build the API base URL from a server address
    ///
    /// Converts `"pdns:8081"` to `<http://pdns:8081>` and strips trailing slashes
    /// from URLs that already carry a scheme.
    #[must_use]
    pub fn build_api_url(server: &str) -> String {
        if server.starts_with("http://") || server.starts_with("https://") {
            server.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", server.trim_end_matches('/'))
        }
    }

    fn zones_url(&self) -> String {
        format!("{}/api/v1/servers/{}/zones", self.base_url, self.server_id)
    }

    fn zone_url(&self, zone: &str) -> String {
        format!("{}/{}", self.zones_url(), zone_fqdn(zone))
    }

    /// Send one request and return the body of a successful response.
    ///
    /// Failures other than a 404 are counted in the API error metric; a 404
    /// is how zone existence is probed.
    async fn request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&T>,
    ) -> Result<String, ApiError> {
        let result = self.send_request(method, url, body).await;
        if let Err(e) = &result {
            if e.status_code() != Some(StatusCode::NOT_FOUND.as_u16()) {
                record_api_error(e);
            }
        }
        result
    }

    async fn send_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&T>,
    ) -> Result<String, ApiError> {
        debug!(method = %method, url = %url, "HTTP API request to control API");

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(API_KEY_HEADER, self.api_key.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::HttpConnectionFailed {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                endpoint: url.to_string(),
                reason: format!("reading body: {e}"),
            })?;

        if !status.is_success() {
            let reason = ErrorBody::parse(&text).unwrap_or(text);
            if status != StatusCode::NOT_FOUND {
                error!(
                    method = %method,
                    url = %url,
                    status = %status,
                    error = %reason,
                    "HTTP API request failed"
                );
            }
            return Err(ApiError::UnexpectedHttpResponse {
                endpoint: url.to_string(),
                status_code: status.as_u16(),
                reason,
            });
        }

        if let Some(message) = ErrorBody::parse(&text) {
            error!(method = %method, url = %url, error = %message, "Control API reported an error");
            return Err(ApiError::EmbeddedError {
                endpoint: url.to_string(),
                message,
            });
        }

        debug!(
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "HTTP API request successful"
        );
        Ok(text)
    }
}

fn record_api_error(err: &ApiError) {
    metrics::record_api_error(err.category(), err.reason());
}

#[async_trait]
impl ControlApi for PdnsClient {
    async fn fetch_zone(&self, zone: &str) -> Result<ZoneSnapshot, ApiError> {
        let url = self.zone_url(zone);
        let body = self.request::<()>(Method::GET, &url, None).await?;
        let snapshot: ZoneSnapshot = serde_json::from_str(&body).map_err(|e| {
            let err = ApiError::InvalidResponse {
                endpoint: url.clone(),
                reason: e.to_string(),
            };
            record_api_error(&err);
            err
        })?;
        debug!(zone = %zone, serial = snapshot.serial, rrsets = snapshot.rrsets.len(), "Fetched zone");
        Ok(snapshot)
    }

    async fn patch_rrsets(&self, zone: &str, changes: &[ChangeOperation]) -> Result<(), ApiError> {
        let url = self.zone_url(zone);
        let body = PatchBody { rrsets: changes };
        self.request(Method::PATCH, &url, Some(&body)).await?;
        info!(zone = %zone, rrsets = changes.len(), "Patched RRsets");
        Ok(())
    }
}

#[async_trait]
impl ZoneCatalog for PdnsClient {
    async fn zone_exists(&self, name: &str) -> Result<bool, ApiError> {
        let url = self.zone_url(name);
        match self.request::<()>(Method::GET, &url, None).await {
            Ok(_) => {
                debug!(zone = %name, "Zone exists");
                Ok(true)
            }
            Err(e) if e.status_code() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                debug!(zone = %name, "Zone does not exist");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_zone(&self, name: &str, kind: &str, masters: &[String]) -> Result<(), ApiError> {
        let body = CreateZoneRequest {
            name: zone_fqdn(name),
            kind: kind.to_string(),
            masters: masters.to_vec(),
            nameservers: Vec::new(),
        };
        self.request(Method::POST, &self.zones_url(), Some(&body))
            .await?;
        info!(zone = %name, kind = %kind, "Created zone");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
