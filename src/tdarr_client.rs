// Upstream client for Tdarr's cruddb statistics document

use bytes::Bytes;
use serde::Serialize;

use crate::config::TdarrConfig;
use crate::decoder;
use crate::error::DecodeError;
use crate::models::StatsSnapshot;
use crate::version;

pub const STATS_PATH: &str = "/api/v2/cruddb";

#[derive(Debug, Clone, Serialize)]
pub struct StatsQuery {
    pub collection: &'static str,
    pub mode: &'static str,
    #[serde(rename = "docID")]
    pub doc_id: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsRequest {
    pub data: StatsQuery,
}

impl Default for StatsRequest {
    fn default() -> Self {
        Self {
            data: StatsQuery {
                collection: "StatisticsJSONDB",
                mode: "getById",
                doc_id: "statistics",
            },
        }
    }
}

pub struct TdarrClient {
    client: reqwest::Client,
    url: String,
}

impl TdarrClient {
    pub fn new(config: &TdarrConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(version::user_agent());
        if !config.verify_ssl {
            tracing::warn!(host = %config.host, "TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        Ok(Self {
            client: builder.build()?,
            url: format!("{}{}", config.host.trim_end_matches('/'), STATS_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POSTs the statistics query and returns the raw response body.
    pub async fn fetch_body(&self) -> Result<Bytes, DecodeError> {
        let request_err = |source| DecodeError::Request {
            url: self.url.clone(),
            source,
        };
        tracing::debug!(url = %self.url, "Requesting statistics");
        let response = self
            .client
            .post(&self.url)
            .json(&StatsRequest::default())
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecodeError::Status { status });
        }
        let body = response.bytes().await.map_err(request_err)?;
        tracing::trace!(body = %String::from_utf8_lossy(&body), "Statistics response body");
        Ok(body)
    }

    /// Fetches and decodes one statistics snapshot.
    pub async fn fetch_stats(&self) -> Result<StatsSnapshot, DecodeError> {
        let body = self.fetch_body().await?;
        decoder::decode_snapshot(&body)
    }
}
